pub mod points_api;
