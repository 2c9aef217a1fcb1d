//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements     | Connects to                     |
//! |----------------|----------------|---------------------------------|
//! | `config_store` | ConfigPort     | JSON file on the config mount   |
//! | `inter_core`   | InterCorePort  | Unix datagram socket to RT core |
//! | `iot_hub`      | CloudPort      | Azure IoT Hub (MQTT over TLS)   |

pub mod config_store;
pub mod inter_core;
pub mod iot_hub;
