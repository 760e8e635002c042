pub mod activity_export;
pub mod local_graph;
pub mod openrouteservice;
pub mod overpass;
pub mod route_generator;
pub mod route_provider;
pub mod street_graph;
pub mod telemetry;
