pub mod colorizers;
pub mod config;
pub mod error;
pub mod frames;
pub mod picture;
pub mod pixel_rect;
pub mod raster;
pub mod request;
pub mod session;
pub mod tile;
pub mod viewer;

pub use colorizers::{builtin_schemes, ColorSchemeRegistry, Colorizer, Rgb, DEFAULT_SCHEME};
pub use config::{ClientConfig, RequestDefaults};
pub use error::{
    ConfigError, FrameError, PictureError, RegistryError, RequestError, SessionError,
};
pub use frames::{CloseSignal, ServerFrame, SetupInfo, TileResult};
pub use picture::PictureModel;
pub use pixel_rect::PixelRect;
pub use raster::{render, Bitmap, PictureRaster, TilePixels, TilePresenter, TileRasterizer};
pub use request::CalculationRequest;
pub use session::{
    Connection, ConnectionEvent, Connector, SessionClient, SessionId, SessionState,
};
pub use tile::{TileListener, TileModel, TileSettings};
pub use viewer::Viewer;
