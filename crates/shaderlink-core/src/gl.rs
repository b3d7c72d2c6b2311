//! GL enum values shared with the host binding surface.

use std::fmt;

/// Raw GL enum as passed across the host boundary.
pub type GlEnum = u32;

pub const DEPTH_BUFFER_BIT: GlEnum = 0x0100;
pub const CULL_FACE: GlEnum = 0x0B44;
pub const DEPTH_TEST: GlEnum = 0x0B71;
pub const FLOAT: GlEnum = 0x1406;
pub const COLOR_BUFFER_BIT: GlEnum = 0x4000;
pub const ARRAY_BUFFER: GlEnum = 0x8892;
pub const STATIC_DRAW: GlEnum = 0x88E4;
pub const FRAGMENT_SHADER: GlEnum = 0x8B30;
pub const VERTEX_SHADER: GlEnum = 0x8B31;
pub const COMPILE_STATUS: GlEnum = 0x8B81;
pub const LINK_STATUS: GlEnum = 0x8B82;

// Extra object queries answered by the bundled hosts
pub const SHADER_TYPE: GlEnum = 0x8B4F;
pub const DELETE_STATUS: GlEnum = 0x8B80;
pub const ATTACHED_SHADERS: GlEnum = 0x8B85;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// GL enum passed to `createShader` for this stage
    pub const fn gl_enum(self) -> GlEnum {
        match self {
            ShaderStage::Vertex => VERTEX_SHADER,
            ShaderStage::Fragment => FRAGMENT_SHADER,
        }
    }

    /// Map a raw shader type enum back to a stage
    pub const fn from_gl_enum(value: GlEnum) -> Option<Self> {
        match value {
            VERTEX_SHADER => Some(ShaderStage::Vertex),
            FRAGMENT_SHADER => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a boolean-as-int status returned by the host.
#[inline]
pub const fn status_is_set(status: i32) -> bool {
    status != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_enum_round_trip() {
        assert_eq!(ShaderStage::Vertex.gl_enum(), 0x8B31);
        assert_eq!(ShaderStage::Fragment.gl_enum(), 0x8B30);
        assert_eq!(ShaderStage::from_gl_enum(VERTEX_SHADER), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_gl_enum(ARRAY_BUFFER), None);
    }

    #[test]
    fn test_status_flag() {
        assert!(!status_is_set(0));
        assert!(status_is_set(1));
        assert!(status_is_set(-1));
    }
}
