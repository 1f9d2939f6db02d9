pub mod chrome;
pub mod hit;
pub mod raster;
pub mod route;
pub mod svg;

pub use chrome::{ChromeLayout, Control};
pub use hit::{Hit, HitTolerance, handle_at, hit_test};
pub use raster::{RasterError, Rasterizer, ResvgRasterizer};
pub use svg::{Provisional, Scene, SceneLayers, render_scene, symbol_svg};
