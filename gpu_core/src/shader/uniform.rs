/// Uniform reflection and typed uniform values
///
/// After linking, a program records its active uniforms (name, location, type,
/// array count) in a `UniformStorage`, so values can be written by name.

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::driver::ActiveUniform;
use crate::utils::HashCombiner;

/// Declared type of an active uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Bool,
    Int,
    UInt,
    Float,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    Sampler2DArray,
    Sampler3D,
    SamplerCube,
    Image2D,
}

impl UniformType {
    /// Opaque types bound through a texture/image unit index
    pub fn is_opaque(self) -> bool {
        matches!(
            self,
            UniformType::Sampler2D
                | UniformType::Sampler2DArray
                | UniformType::Sampler3D
                | UniformType::SamplerCube
                | UniformType::Image2D
        )
    }
}

/// Value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    UVec2(UVec2),
    UVec3(UVec3),
    UVec4(UVec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// Whether the value can be written to a uniform of type `uniform_type`
    ///
    /// Opaque types (samplers, images) take an `Int` unit index.
    pub fn is_compatible_with(&self, uniform_type: UniformType) -> bool {
        match self {
            UniformValue::Bool(_) => uniform_type == UniformType::Bool,
            UniformValue::Int(_) => {
                matches!(uniform_type, UniformType::Int | UniformType::Bool) || uniform_type.is_opaque()
            }
            UniformValue::UInt(_) => uniform_type == UniformType::UInt,
            UniformValue::Float(_) => uniform_type == UniformType::Float,
            UniformValue::Vec2(_) => uniform_type == UniformType::Vec2,
            UniformValue::Vec3(_) => uniform_type == UniformType::Vec3,
            UniformValue::Vec4(_) => uniform_type == UniformType::Vec4,
            UniformValue::IVec2(_) => uniform_type == UniformType::IVec2,
            UniformValue::IVec3(_) => uniform_type == UniformType::IVec3,
            UniformValue::IVec4(_) => uniform_type == UniformType::IVec4,
            UniformValue::UVec2(_) => uniform_type == UniformType::UVec2,
            UniformValue::UVec3(_) => uniform_type == UniformType::UVec3,
            UniformValue::UVec4(_) => uniform_type == UniformType::UVec4,
            UniformValue::Mat2(_) => uniform_type == UniformType::Mat2,
            UniformValue::Mat3(_) => uniform_type == UniformType::Mat3,
            UniformValue::Mat4(_) => uniform_type == UniformType::Mat4,
        }
    }
}

macro_rules! impl_uniform_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )+
    };
}

impl_uniform_from! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    UVec2 => UVec2,
    UVec3 => UVec3,
    UVec4 => UVec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

/// Active uniforms of a linked program, sorted by name
#[derive(Debug, Clone, Default)]
pub struct UniformStorage {
    uniforms: Vec<ActiveUniform>,
}

impl UniformStorage {
    /// Build from driver introspection
    ///
    /// Uniforms without a location (block members) are dropped.
    pub fn from_active(mut uniforms: Vec<ActiveUniform>) -> Self {
        uniforms.retain(|uniform| uniform.location >= 0);
        uniforms.sort_by(|a, b| a.name.cmp(&b.name));
        Self { uniforms }
    }

    pub fn find(&self, name: &str) -> Option<&ActiveUniform> {
        self.uniforms
            .binary_search_by(|uniform| uniform.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.uniforms[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveUniform> {
        self.uniforms.iter()
    }

    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }

    /// Hash of the uniform layout (names, locations, types, counts)
    ///
    /// Programs with equal layout hashes accept the same uniform writes.
    pub fn layout_hash(&self) -> u64 {
        let mut hasher = HashCombiner::new();
        hasher.add(&self.uniforms.len());
        for uniform in &self.uniforms {
            hasher
                .add(uniform.name.as_str())
                .add(&uniform.location)
                .add(&uniform.uniform_type)
                .add(&uniform.count);
        }
        hasher.finish()
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
