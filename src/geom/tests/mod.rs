mod test_blend_basic;
mod test_smooth_basic;
mod test_topology_basic;
