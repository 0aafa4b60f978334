pub mod static_layer;

pub use static_layer::{StaticLayer, StaticLayerConfig};
