#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use depthrig_3d as geom;
