pub mod devices;

pub use devices::DeviceDataService;
