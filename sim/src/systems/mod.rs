//! ECS systems for one simulation frame.
//!
//! Each phase is a system and runs in its own single-threaded schedule, in
//! this order:
//!
//! 1. `reset_system` - zero velocities, clear owned lists and marker owners
//! 2. `ownership_system` - agents claim markers within their grid radius
//! 3. `assign_owned_markers_system` - activated markers go to final owners
//! 4. `velocity_system` - the active `VelocityPolicy` turns markers into velocity
//! 5. `movement_system` - integrate and clamp to the plane
//! 6. `occupancy_refresh_system` (in `crate::spatial`) - rebuild agent cells

pub mod movement;
pub mod ownership;
pub mod reset;
pub mod serialization;
pub mod velocity;

pub use movement::*;
pub use ownership::*;
pub use reset::*;
pub use serialization::*;
pub use velocity::*;
