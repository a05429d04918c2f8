//! Underlay is an interactive text-behind-subject image compositing engine.
//!
//! The public API is session-oriented:
//!
//! - Feed an uploaded photo and its background-removed cutout into an [`EditSession`]
//! - Drive text layers with pointer gestures through a [`TransformController`]
//! - Ask for the live [`PreviewStack`] after every state change, and for a
//!   one-shot [`Compositor::flatten`] at the photo's native resolution on export
//!
//! Hosted collaborators (background removal, image generation, text
//! suggestions, HEIC decode, PDF assembly) are traits in [`remote`]; the
//! credential failover policy for the rate-limited background-removal
//! upstream lives in [`KeyPool`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod input;
mod keys;
mod scene;

/// Collaborator contracts for hosted services.
pub mod remote;
/// Live preview and export rasterization.
pub mod render;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{
    ContainerSize, PercentPoint, PixelSize, Rgba8Premul, export_scale_factor, to_natural_pixels,
};
pub use crate::foundation::error::{UnderlayError, UnderlayResult};

pub use crate::input::gesture::{GestureConfig, GestureTarget, TransformController};
pub use crate::input::placement::{
    PlacementConfig, PlacementController, PlacementRect, PlacementTarget,
};
pub use crate::input::pointer::{
    PointerEvent, PointerKind, PointerPhase, PointerPoint, ResizeHandle,
};
pub use crate::keys::pool::{ApiKey, KEY_ENV_NAMES, KEY_RESET_INTERVAL, KeyPool, KeyResetTimer};
pub use crate::remote::removebg::{BackgroundRemoval, DeviceClass, ProxyBackgroundRemoval};
pub use crate::remote::transport::{RemoveBgTransport, UpstreamResponse};
pub use crate::render::compositor::{
    Compositor, FlatRaster, FlattenRequest, TEXT_BEHIND_FILENAME, decode_image,
};
pub use crate::render::preview::{ImageTier, PreviewStack, TextTier, render_preview};
pub use crate::render::text::FontStore;
pub use crate::scene::layer::{
    FONT_FAMILIES, FONT_SIZE_RANGE_PX, FontWeight, LayerId, TextLayer, TextShadow, TextStroke,
    TextStyle,
};
pub use crate::scene::session::{EditSession, PreparedImage, UploadTicket};
