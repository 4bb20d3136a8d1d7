use crate::ir::{BaseType, TypeDescriptor};
use crate::ReflectorResult;

/// Host representations the generated bindings know how to work with. Layouts are tightly packed,
/// so only the byte size of each type matters, never its alignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    /// 4x4 column-major f32 matrix
    Matrix,
    Point,
    Vector3,
    Vector4,
    Bool,
    Float,
    UInt,
    Int,
    /// Opaque bytes
    Padding(usize),
}

impl HostType {
    pub fn type_name(&self) -> String {
        match self {
            HostType::Matrix => "Matrix".to_string(),
            HostType::Point => "Point".to_string(),
            HostType::Vector3 => "Vector3".to_string(),
            HostType::Vector4 => "Vector4".to_string(),
            HostType::Bool => "bool".to_string(),
            HostType::Float => "f32".to_string(),
            HostType::UInt => "u32".to_string(),
            HostType::Int => "i32".to_string(),
            HostType::Padding(size) => format!("Padding<{}>", size),
        }
    }

    pub fn byte_size(&self) -> usize {
        match self {
            HostType::Matrix => std::mem::size_of::<[f32; 16]>(),
            HostType::Point => std::mem::size_of::<[f32; 2]>(),
            HostType::Vector3 => std::mem::size_of::<[f32; 3]>(),
            HostType::Vector4 => std::mem::size_of::<[f32; 4]>(),
            HostType::Bool => std::mem::size_of::<bool>(),
            HostType::Float => std::mem::size_of::<f32>(),
            HostType::UInt => std::mem::size_of::<u32>(),
            HostType::Int => std::mem::size_of::<i32>(),
            HostType::Padding(size) => *size,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A named host type, followed by `trailing_padding` bytes when the declared width is wider
    /// than the host type
    Known {
        host_type: HostType,
        trailing_padding: usize,
    },
    /// Nothing on the host can name this type, so it is carried as raw bytes
    Opaque { byte_length: usize },
}

impl Classification {
    pub fn byte_length(&self) -> usize {
        match self {
            Classification::Known {
                host_type,
                trailing_padding,
            } => host_type.byte_size() + trailing_padding,
            Classification::Opaque { byte_length } => *byte_length,
        }
    }
}

pub type ClassifyRule = fn(&TypeDescriptor) -> Option<Classification>;

/// Rules for members of reflected structs, first match wins. Anything unmatched is opaque.
pub const STRUCT_MEMBER_RULES: &[ClassifyRule] = &[
    classify_matrix,
    classify_float_vector,
    classify_scalar,
];

/// Vertex attributes only ever map to float vectors. Matrices and scalars are carried as padding.
pub const VERTEX_INPUT_RULES: &[ClassifyRule] = &[classify_float_vector];

/// Fails only when an unmatched type's declared size can't be represented
pub fn classify(
    rules: &[ClassifyRule],
    ty: &TypeDescriptor,
) -> ReflectorResult<Classification> {
    if let Some(classification) = rules.iter().find_map(|rule| rule(ty)) {
        return Ok(classification);
    }

    Ok(Classification::Opaque {
        byte_length: ty.declared_byte_length()?,
    })
}

pub fn classify_struct_member(ty: &TypeDescriptor) -> ReflectorResult<Classification> {
    classify(STRUCT_MEMBER_RULES, ty)
}

pub fn classify_vertex_input(ty: &TypeDescriptor) -> ReflectorResult<Classification> {
    classify(VERTEX_INPUT_RULES, ty)
}

fn is_f32(ty: &TypeDescriptor) -> bool {
    ty.base_type == BaseType::Float && ty.width as usize == std::mem::size_of::<f32>() * 8
}

fn known(host_type: HostType) -> Classification {
    Classification::Known {
        host_type,
        trailing_padding: 0,
    }
}

pub fn classify_matrix(ty: &TypeDescriptor) -> Option<Classification> {
    if is_f32(ty) && ty.columns == 4 && ty.vec_size == 4 {
        Some(known(HostType::Matrix))
    } else {
        None
    }
}

pub fn classify_float_vector(ty: &TypeDescriptor) -> Option<Classification> {
    if !is_f32(ty) || ty.columns != 1 {
        return None;
    }

    match ty.vec_size {
        2 => Some(known(HostType::Point)),
        3 => Some(known(HostType::Vector3)),
        4 => Some(known(HostType::Vector4)),
        _ => None,
    }
}

fn known_scalar_type(base_type: BaseType) -> Option<HostType> {
    match base_type {
        BaseType::Boolean => Some(HostType::Bool),
        BaseType::Float => Some(HostType::Float),
        BaseType::UInt => Some(HostType::UInt),
        BaseType::Int => Some(HostType::Int),
        _ => None,
    }
}

pub fn classify_scalar(ty: &TypeDescriptor) -> Option<Classification> {
    if ty.columns != 1 || ty.vec_size != 1 {
        return None;
    }

    let host_type = known_scalar_type(ty.base_type)?;
    let declared_size = ty.width as usize / 8;
    Some(Classification::Known {
        host_type,
        trailing_padding: declared_size.saturating_sub(host_type.byte_size()),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn known_type(
        host_type: HostType,
        trailing_padding: usize,
    ) -> Classification {
        Classification::Known {
            host_type,
            trailing_padding,
        }
    }

    #[test]
    fn test_matrix() {
        let mat4 = TypeDescriptor::new(BaseType::Float, 32, 4, 4);
        assert_eq!(
            classify_struct_member(&mat4).unwrap(),
            known_type(HostType::Matrix, 0)
        );
        assert_eq!(classify_struct_member(&mat4).unwrap().byte_length(), 64);

        // Only 4x4 is special cased
        let mat3 = TypeDescriptor::new(BaseType::Float, 32, 3, 3);
        assert_eq!(
            classify_struct_member(&mat3).unwrap(),
            Classification::Opaque { byte_length: 36 }
        );

        let dmat4 = TypeDescriptor::new(BaseType::Double, 64, 4, 4);
        assert_eq!(
            classify_struct_member(&dmat4).unwrap(),
            Classification::Opaque { byte_length: 128 }
        );
    }

    #[test]
    fn test_float_vectors() {
        let vec2 = TypeDescriptor::new(BaseType::Float, 32, 2, 1);
        let vec3 = TypeDescriptor::new(BaseType::Float, 32, 3, 1);
        let vec4 = TypeDescriptor::new(BaseType::Float, 32, 4, 1);
        assert_eq!(classify_struct_member(&vec2).unwrap(), known_type(HostType::Point, 0));
        assert_eq!(classify_struct_member(&vec2).unwrap().byte_length(), 8);
        assert_eq!(
            classify_struct_member(&vec3).unwrap(),
            known_type(HostType::Vector3, 0)
        );
        assert_eq!(classify_struct_member(&vec3).unwrap().byte_length(), 12);
        assert_eq!(
            classify_struct_member(&vec4).unwrap(),
            known_type(HostType::Vector4, 0)
        );
        assert_eq!(classify_struct_member(&vec4).unwrap().byte_length(), 16);

        let ivec4 = TypeDescriptor::new(BaseType::Int, 32, 4, 1);
        assert_eq!(
            classify_struct_member(&ivec4).unwrap(),
            Classification::Opaque { byte_length: 16 }
        );

        let dvec2 = TypeDescriptor::new(BaseType::Double, 64, 2, 1);
        assert_eq!(
            classify_struct_member(&dvec2).unwrap(),
            Classification::Opaque { byte_length: 16 }
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Float, 32)).unwrap(),
            known_type(HostType::Float, 0)
        );
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::UInt, 32)).unwrap(),
            known_type(HostType::UInt, 0)
        );
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Int, 32)).unwrap(),
            known_type(HostType::Int, 0)
        );
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Boolean, 8)).unwrap(),
            known_type(HostType::Bool, 0)
        );
    }

    #[test]
    fn test_scalar_width_padding() {
        // Booleans are 32 bits wide in shaders but a single byte on the host
        let boolean =
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Boolean, 32)).unwrap();
        assert_eq!(boolean, known_type(HostType::Bool, 3));
        assert_eq!(boolean.byte_length(), 4);

        let wide_float =
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Float, 64)).unwrap();
        assert_eq!(wide_float, known_type(HostType::Float, 4));
        assert_eq!(wide_float.byte_length(), 8);
    }

    #[test]
    fn test_unknown_scalars_are_opaque() {
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Int64, 64)).unwrap(),
            Classification::Opaque { byte_length: 8 }
        );
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Half, 16)).unwrap(),
            Classification::Opaque { byte_length: 2 }
        );
        assert_eq!(
            classify_struct_member(&TypeDescriptor::scalar(BaseType::Sampler, 0)).unwrap(),
            Classification::Opaque { byte_length: 0 }
        );
    }

    #[test]
    fn test_rule_order() {
        // A 4x4 float matrix is also "4 wide" but must never fall through to a vector or padding
        let mat4 = TypeDescriptor::new(BaseType::Float, 32, 4, 4);
        assert_eq!(classify_matrix(&mat4), Some(known_type(HostType::Matrix, 0)));
        assert_eq!(classify_float_vector(&mat4), None);
        assert_eq!(classify_scalar(&mat4), None);

        let reversed: &[ClassifyRule] = &[classify_scalar, classify_matrix];
        assert_eq!(classify(reversed, &mat4).unwrap(), known_type(HostType::Matrix, 0));
        assert_eq!(
            classify(&[], &mat4).unwrap(),
            Classification::Opaque { byte_length: 64 }
        );
    }

    #[test]
    fn test_vertex_input_rules() {
        let vec2 = TypeDescriptor::new(BaseType::Float, 32, 2, 1);
        assert_eq!(classify_vertex_input(&vec2).unwrap(), known_type(HostType::Point, 0));

        let mat4 = TypeDescriptor::new(BaseType::Float, 32, 4, 4);
        assert_eq!(
            classify_vertex_input(&mat4).unwrap(),
            Classification::Opaque { byte_length: 64 }
        );

        let float = TypeDescriptor::scalar(BaseType::Float, 32);
        assert_eq!(
            classify_vertex_input(&float).unwrap(),
            Classification::Opaque { byte_length: 4 }
        );

        let boolean = TypeDescriptor::scalar(BaseType::Boolean, 32);
        assert_eq!(
            classify_vertex_input(&boolean).unwrap(),
            Classification::Opaque { byte_length: 4 }
        );
    }

    #[test]
    fn test_oversized_opaque_type() {
        let huge = TypeDescriptor::new(BaseType::Double, u32::MAX, u32::MAX, u32::MAX);
        assert!(matches!(
            classify_struct_member(&huge),
            Err(crate::ReflectorError::TypeSizeOverflow(_))
        ));
        assert!(classify_vertex_input(&huge).is_err());
    }

    #[test]
    fn test_host_type_names() {
        assert_eq!(HostType::Matrix.type_name(), "Matrix");
        assert_eq!(HostType::Float.type_name(), "f32");
        assert_eq!(HostType::Padding(12).type_name(), "Padding<12>");
        assert_eq!(HostType::Padding(12).byte_size(), 12);
    }
}
