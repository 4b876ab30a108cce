//! Vertex attribute descriptors.
//!
//! A [`VertexLayout`] is the ordered list of attributes one vertex carries,
//! together with the byte stride they add up to. The buffer-binding code in
//! `mesh` turns it into a `wgpu::VertexBufferLayout`.

use thiserror::Error;

/// Scalar type of one attribute component.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementType {
    #[default]
    Float,
    Double,
    Int,
    UnsignedInt,
    Short,
    UnsignedShort,
    Byte,
    UnsignedByte,
}

impl ElementType {
    /// Size in bytes of a single component.
    pub const fn size_bytes(self) -> u32 {
        match self {
            ElementType::Double => 8,
            ElementType::Float | ElementType::Int | ElementType::UnsignedInt => 4,
            ElementType::Short | ElementType::UnsignedShort => 2,
            ElementType::Byte | ElementType::UnsignedByte => 1,
        }
    }
}

/// One per-vertex input. Never mutated after it is added to a layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Shader location.
    pub index: u32,
    /// Number of components (1..=4).
    pub components: u32,
    pub kind: ElementType,
    pub normalize: bool,
}

impl Attribute {
    /// A non-normalized float attribute, the common case.
    pub const fn new(index: u32, components: u32) -> Self {
        Self { index, components, kind: ElementType::Float, normalize: false }
    }

    pub const fn with_kind(mut self, kind: ElementType) -> Self {
        self.kind = kind;
        self
    }

    pub const fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Bytes this attribute contributes to the vertex stride.
    pub const fn size_bytes(&self) -> u32 {
        self.components * self.kind.size_bytes()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("attribute {index}: no vertex format for {components} x {kind:?} (normalize={normalize})")]
    UnsupportedFormat { index: u32, components: u32, kind: ElementType, normalize: bool },
}

/// Append-only list of attributes with an incrementally maintained stride.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<Attribute>,
    stride: u32,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut layout = Self::new();
        for attribute in attributes {
            layout.add_attribute(attribute);
        }
        layout
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.increase_stride(&attribute);
        self.attributes.push(attribute);
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn increase_stride(&mut self, attribute: &Attribute) {
        self.stride += attribute.size_bytes();
    }

    /// wgpu attribute descriptors, packed in insertion order.
    pub fn wgpu_attributes(&self) -> Result<Vec<wgpu::VertexAttribute>, LayoutError> {
        let mut offset: wgpu::BufferAddress = 0;
        let mut out = Vec::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            out.push(wgpu::VertexAttribute {
                format: vertex_format(attribute)?,
                offset,
                shader_location: attribute.index,
            });
            offset += attribute.size_bytes() as wgpu::BufferAddress;
        }
        Ok(out)
    }

    /// Per-vertex buffer layout over `attributes` (from [`Self::wgpu_attributes`]).
    pub fn buffer_layout<'a>(
        &self,
        attributes: &'a [wgpu::VertexAttribute],
    ) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

fn vertex_format(attribute: &Attribute) -> Result<wgpu::VertexFormat, LayoutError> {
    use wgpu::VertexFormat as F;
    use ElementType::*;

    let format = match (attribute.kind, attribute.components, attribute.normalize) {
        // normalization has no meaning for float inputs
        (Float, 1, _) => Some(F::Float32),
        (Float, 2, _) => Some(F::Float32x2),
        (Float, 3, _) => Some(F::Float32x3),
        (Float, 4, _) => Some(F::Float32x4),
        (Double, 1, _) => Some(F::Float64),
        (Double, 2, _) => Some(F::Float64x2),
        (Double, 3, _) => Some(F::Float64x3),
        (Double, 4, _) => Some(F::Float64x4),
        (Int, 1, false) => Some(F::Sint32),
        (Int, 2, false) => Some(F::Sint32x2),
        (Int, 3, false) => Some(F::Sint32x3),
        (Int, 4, false) => Some(F::Sint32x4),
        (UnsignedInt, 1, false) => Some(F::Uint32),
        (UnsignedInt, 2, false) => Some(F::Uint32x2),
        (UnsignedInt, 3, false) => Some(F::Uint32x3),
        (UnsignedInt, 4, false) => Some(F::Uint32x4),
        (Short, 2, false) => Some(F::Sint16x2),
        (Short, 4, false) => Some(F::Sint16x4),
        (Short, 2, true) => Some(F::Snorm16x2),
        (Short, 4, true) => Some(F::Snorm16x4),
        (UnsignedShort, 2, false) => Some(F::Uint16x2),
        (UnsignedShort, 4, false) => Some(F::Uint16x4),
        (UnsignedShort, 2, true) => Some(F::Unorm16x2),
        (UnsignedShort, 4, true) => Some(F::Unorm16x4),
        (Byte, 2, false) => Some(F::Sint8x2),
        (Byte, 4, false) => Some(F::Sint8x4),
        (Byte, 2, true) => Some(F::Snorm8x2),
        (Byte, 4, true) => Some(F::Snorm8x4),
        (UnsignedByte, 2, false) => Some(F::Uint8x2),
        (UnsignedByte, 4, false) => Some(F::Uint8x4),
        (UnsignedByte, 2, true) => Some(F::Unorm8x2),
        (UnsignedByte, 4, true) => Some(F::Unorm8x4),
        _ => None,
    };

    format.ok_or(LayoutError::UnsupportedFormat {
        index: attribute.index,
        components: attribute.components,
        kind: attribute.kind,
        normalize: attribute.normalize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_sum_of_attribute_sizes() {
        let layout = VertexLayout::from_attributes([
            Attribute::new(0, 3),
            Attribute::new(1, 4).with_kind(ElementType::UnsignedByte).normalized(true),
            Attribute::new(2, 2).with_kind(ElementType::Short),
            Attribute::new(3, 1).with_kind(ElementType::Double),
        ]);
        assert_eq!(layout.stride(), 12 + 4 + 4 + 8);
        assert_eq!(layout.attributes().len(), 4);
    }

    #[test]
    fn adding_an_attribute_grows_stride_by_its_size() {
        let mut layout = VertexLayout::from_attributes([Attribute::new(0, 3), Attribute::new(1, 3)]);
        let before = layout.stride();
        let extra = Attribute::new(2, 2).with_kind(ElementType::UnsignedInt);
        layout.add_attribute(extra);
        assert_eq!(layout.stride() - before, extra.size_bytes());
        assert_eq!(layout.attributes().last(), Some(&extra));
    }

    #[test]
    fn empty_layout_has_zero_stride() {
        let layout = VertexLayout::new();
        assert_eq!(layout.stride(), 0);
        assert!(layout.attributes().is_empty());
    }

    #[test]
    fn wgpu_offsets_follow_insertion_order() {
        let layout = VertexLayout::from_attributes([
            Attribute::new(0, 3),
            Attribute::new(1, 3),
            Attribute::new(2, 2),
        ]);
        let attrs = layout.wgpu_attributes().unwrap();
        let offsets: Vec<_> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert_eq!(attrs[2].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attrs[1].shader_location, 1);

        let buffer = layout.buffer_layout(&attrs);
        assert_eq!(buffer.array_stride, 32);
        assert_eq!(buffer.step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn three_byte_attribute_has_no_wgpu_format() {
        let layout = VertexLayout::from_attributes([
            Attribute::new(5, 3).with_kind(ElementType::UnsignedByte),
        ]);
        // stride still accumulates; only the wgpu mapping refuses it
        assert_eq!(layout.stride(), 3);
        assert_eq!(
            layout.wgpu_attributes(),
            Err(LayoutError::UnsupportedFormat {
                index: 5,
                components: 3,
                kind: ElementType::UnsignedByte,
                normalize: false,
            })
        );
    }
}
