mod vehicle_store;

pub use vehicle_store::VehicleStore;
