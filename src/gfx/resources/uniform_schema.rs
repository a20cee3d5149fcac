//! Enumerated uniform schema shared by the Rust uniform block and WGSL
//!
//! The `Globals` block is uploaded as one `bytemuck` struct, so its WGSL
//! declaration has to list the same members in the same order with the same
//! types. [`UniformSlot`] is the single source of truth for that contract and
//! [`validate_shader`] checks a shader's struct declarations against it once,
//! when the pipelines are built.

use crate::{error::ShaderError, gfx::scene::pool::MAX_POINT_LIGHTS};

/// WGSL type of a uniform member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Mat4,
    Vec4,
    U32,
    F32,
    Struct(&'static str),
    Array(&'static str, usize),
}

impl UniformType {
    /// Canonical WGSL spelling, without whitespace
    pub fn wgsl(&self) -> String {
        match self {
            UniformType::Mat4 => "mat4x4<f32>".to_string(),
            UniformType::Vec4 => "vec4<f32>".to_string(),
            UniformType::U32 => "u32".to_string(),
            UniformType::F32 => "f32".to_string(),
            UniformType::Struct(name) => name.to_string(),
            UniformType::Array(element, len) => format!("array<{},{}>", element, len),
        }
    }
}

/// Members of the WGSL `Globals` struct, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSlot {
    View,
    Projection,
    LightSpace,
    ViewPosition,
    DirLight,
    PointLights,
    SpotLight,
    PointLightCount,
    Shininess,
    ShadowBias,
    ShadowTexelSize,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 11] = [
        UniformSlot::View,
        UniformSlot::Projection,
        UniformSlot::LightSpace,
        UniformSlot::ViewPosition,
        UniformSlot::DirLight,
        UniformSlot::PointLights,
        UniformSlot::SpotLight,
        UniformSlot::PointLightCount,
        UniformSlot::Shininess,
        UniformSlot::ShadowBias,
        UniformSlot::ShadowTexelSize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UniformSlot::View => "view",
            UniformSlot::Projection => "projection",
            UniformSlot::LightSpace => "light_space",
            UniformSlot::ViewPosition => "view_position",
            UniformSlot::DirLight => "dir_light",
            UniformSlot::PointLights => "point_lights",
            UniformSlot::SpotLight => "spot_light",
            UniformSlot::PointLightCount => "point_light_count",
            UniformSlot::Shininess => "shininess",
            UniformSlot::ShadowBias => "shadow_bias",
            UniformSlot::ShadowTexelSize => "shadow_texel_size",
        }
    }

    pub fn ty(&self) -> UniformType {
        match self {
            UniformSlot::View | UniformSlot::Projection | UniformSlot::LightSpace => {
                UniformType::Mat4
            }
            UniformSlot::ViewPosition => UniformType::Vec4,
            UniformSlot::DirLight => UniformType::Struct("DirLight"),
            UniformSlot::PointLights => UniformType::Array("PointLight", MAX_POINT_LIGHTS),
            UniformSlot::SpotLight => UniformType::Struct("SpotLight"),
            UniformSlot::PointLightCount => UniformType::U32,
            UniformSlot::Shininess | UniformSlot::ShadowBias | UniformSlot::ShadowTexelSize => {
                UniformType::F32
            }
        }
    }
}

/// Expected layout of one WGSL struct
#[derive(Debug, Clone)]
pub struct StructSchema {
    pub name: &'static str,
    pub members: Vec<(&'static str, UniformType)>,
}

fn vec4_struct(name: &'static str, members: &[&'static str]) -> StructSchema {
    StructSchema {
        name,
        members: members.iter().map(|m| (*m, UniformType::Vec4)).collect(),
    }
}

/// Every struct the lit and emissive shaders must declare
pub fn globals_schema() -> Vec<StructSchema> {
    vec![
        vec4_struct("DirLight", &["direction", "ambient", "diffuse", "specular"]),
        vec4_struct(
            "PointLight",
            &["position", "ambient", "diffuse", "specular", "attenuation"],
        ),
        vec4_struct(
            "SpotLight",
            &[
                "position",
                "direction",
                "ambient",
                "diffuse",
                "specular",
                "attenuation",
                "cut_off",
            ],
        ),
        StructSchema {
            name: "Globals",
            members: UniformSlot::ALL.iter().map(|s| (s.name(), s.ty())).collect(),
        },
    ]
}

/// Struct declared by the depth-only shader
pub fn shadow_schema() -> Vec<StructSchema> {
    vec![StructSchema {
        name: "ShadowGlobals",
        members: vec![("light_space", UniformType::Mat4)],
    }]
}

/// Removes `//` line comments and `/* */` block comments
///
/// WGSL block comments nest. Newlines are kept.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut block_depth = 0usize;

    while let Some(ch) = chars.next() {
        match (ch, chars.peek().copied()) {
            ('/', Some('*')) => {
                chars.next();
                block_depth += 1;
            }
            ('*', Some('/')) if block_depth > 0 => {
                chars.next();
                block_depth -= 1;
            }
            ('/', Some('/')) if block_depth == 0 => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            ('\n', _) => out.push('\n'),
            _ if block_depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Returns the `name: type` members of `struct <name> { ... }`
fn struct_members(source: &str, name: &str) -> Option<Vec<(String, String)>> {
    let mut search = source;
    let body = loop {
        let start = search.find("struct")?;
        let rest = &search[start + "struct".len()..];
        let open = rest.find('{')?;
        if rest[..open].trim() == name {
            let body = &rest[open + 1..];
            let close = body.find('}')?;
            break &body[..close];
        }
        search = rest;
    };

    // Split on commas that are not inside `<...>`
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in body.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                members.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    members.push(current);

    Some(
        members
            .iter()
            .filter_map(|m| {
                let m: String = m.split_whitespace().collect();
                // Member attributes like `@align(16)` are not part of the contract
                let m = m.rsplit(')').next().unwrap_or(&m).to_string();
                let (member, ty) = m.split_once(':')?;
                Some((member.to_string(), ty.to_string()))
            })
            .collect(),
    )
}

/// Checks the struct declarations of a WGSL source against a schema
pub fn validate_shader(
    shader: &str,
    source: &str,
    schema: &[StructSchema],
) -> Result<(), ShaderError> {
    let source = strip_comments(source);

    for expected in schema {
        let found = struct_members(&source, expected.name).ok_or_else(|| {
            ShaderError::MissingStruct {
                shader: shader.to_string(),
                name: expected.name.to_string(),
            }
        })?;

        if found.len() != expected.members.len() {
            return Err(ShaderError::MemberCount {
                shader: shader.to_string(),
                name: expected.name.to_string(),
                expected: expected.members.len(),
                found: found.len(),
            });
        }

        for (index, ((name, ty), (found_name, found_ty))) in
            expected.members.iter().zip(found.iter()).enumerate()
        {
            let expected_decl = format!("{}:{}", name, ty.wgsl());
            let found_decl = format!("{}:{}", found_name, found_ty);
            if expected_decl != found_decl {
                return Err(ShaderError::MemberMismatch {
                    shader: shader.to_string(),
                    name: expected.name.to_string(),
                    index,
                    expected: expected_decl,
                    found: found_decl,
                });
            }
        }
    }

    log::debug!("shader '{}' matches the uniform schema", shader);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::shaders;

    #[test]
    fn test_bundled_shaders_match_schema() {
        validate_shader("scene", shaders::SCENE, &globals_schema()).unwrap();
        validate_shader("light_cube", shaders::LIGHT_CUBE, &globals_schema()).unwrap();
        validate_shader("shadow_depth", shaders::SHADOW_DEPTH, &shadow_schema()).unwrap();
    }

    #[test]
    fn test_renamed_member_is_rejected() {
        let broken = shaders::SCENE.replacen("shininess: f32", "shine: f32", 1);
        let err = validate_shader("scene", &broken, &globals_schema()).unwrap_err();

        match err {
            ShaderError::MemberMismatch { name, index, .. } => {
                assert_eq!(name, "Globals");
                assert_eq!(index, 8);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_wrong_array_length_is_rejected() {
        let broken = shaders::SCENE.replacen("array<PointLight, 4>", "array<PointLight, 8>", 1);
        assert!(matches!(
            validate_shader("scene", &broken, &globals_schema()),
            Err(ShaderError::MemberMismatch { index: 5, .. })
        ));
    }

    #[test]
    fn test_missing_struct_is_reported() {
        let source = "struct Other { a: f32, }";
        assert_eq!(
            validate_shader("tiny", source, &shadow_schema()),
            Err(ShaderError::MissingStruct {
                shader: "tiny".to_string(),
                name: "ShadowGlobals".to_string(),
            })
        );
    }

    #[test]
    fn test_member_parsing_ignores_comments_and_trailing_comma() {
        let source = "
            // leading comment
            struct ShadowGlobals {
                light_space: mat4x4<f32>, // trailing comment
            };
        ";
        validate_shader("tiny", source, &shadow_schema()).unwrap();
    }

    #[test]
    fn test_extra_member_changes_count() {
        let source = "struct ShadowGlobals { light_space: mat4x4<f32>, extra: f32 }";
        assert!(matches!(
            validate_shader("tiny", source, &shadow_schema()),
            Err(ShaderError::MemberCount { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn test_block_comments_hide_declarations() {
        let source = "
            /* struct ShadowGlobals { light_space: mat4x4<f32>, extra: f32 } */
            struct ShadowGlobals {
                /* nested /* comment */ still hidden */ light_space: mat4x4<f32>,
            };
        ";
        validate_shader("tiny", source, &shadow_schema()).unwrap();
    }

    #[test]
    fn test_commented_out_struct_counts_as_missing() {
        let source = "/*\nstruct ShadowGlobals { light_space: mat4x4<f32> }\n*/";
        assert!(matches!(
            validate_shader("tiny", source, &shadow_schema()),
            Err(ShaderError::MissingStruct { .. })
        ));
    }
}
