//! Collaborator implementations: device position, Google web services and
//! connectivity probing.

pub mod connectivity;
pub mod device;
pub mod geocoder;
pub mod places;

pub use connectivity::{Connectivity, ConnectivityMonitor, ConnectivityProbe, HttpProbe};
pub use device::ConfiguredLocationProvider;
pub use geocoder::GoogleGeocoder;
pub use places::GooglePlacesClient;
