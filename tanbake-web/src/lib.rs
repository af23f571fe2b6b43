//! Tanbake Web - WASM bindings for the tangent baker
//!
//! Buffers cross the boundary as `Uint8Array`s in the same layouts the
//! native API uses.
use tanbake_core::primitives::{self, BoundingBox};
use tanbake_core::{BakeConfig, BakeError, Baker, DegeneratePolicy};
use wasm_bindgen::prelude::*;

fn to_js(error: BakeError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub struct WebBaker {
    baker: Baker,
}

#[wasm_bindgen]
impl WebBaker {
    /// Pick a backend once; without wasm threads this settles on the portable one
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebBaker {
        WebBaker {
            baker: Baker::select(&BakeConfig::default()),
        }
    }

    /// Bake a pre-bake buffer into a new post-bake buffer
    pub fn bake(&self, input: &[u8]) -> Result<Vec<u8>, JsValue> {
        self.baker.bake(input).map_err(to_js)
    }

    /// Replace non-invertible UV bases with zero vectors instead of Inf/NaN
    #[wasm_bindgen(js_name = zeroDegenerate)]
    pub fn zero_degenerate(self) -> WebBaker {
        WebBaker {
            baker: self.baker.with_policy(DegeneratePolicy::Zero),
        }
    }

    pub fn backend(&self) -> String {
        self.baker.backend_name().to_string()
    }
}

impl Default for WebBaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-bake buffer of the default cube
#[wasm_bindgen(js_name = cubeVertices)]
pub fn cube_vertices() -> Vec<u8> {
    primitives::cube_bytes(&BoundingBox::default())
}

/// Position-only full-screen triangle
#[wasm_bindgen(js_name = screenTriangleVertices)]
pub fn screen_triangle_vertices() -> Vec<u8> {
    primitives::screen_triangle_bytes()
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bake_cube_through_bindings() {
        let baker = WebBaker {
            baker: Baker::portable(),
        };
        let baked = baker.bake(&cube_vertices()).unwrap();
        assert_eq!(baked.len(), 36 * 56);
        assert_eq!(baker.backend(), "portable");
    }

    #[test]
    fn test_screen_triangle_vertices() {
        assert_eq!(screen_triangle_vertices().len(), 36);
    }
}
