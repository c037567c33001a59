mod lifecycle_test;
mod scenario_test;
