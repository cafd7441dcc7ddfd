//! Compact type formatting for diagnostics and tests.

use crate::solver::types::*;
use crate::solver::TypeDatabase;

/// Render a type in source-like notation.
pub fn format_type(db: &dyn TypeDatabase, type_id: TypeId) -> String {
    match db.lookup(type_id) {
        None => "<none>".to_string(),
        Some(TypeKey::Intrinsic(kind)) => intrinsic_name(kind).to_string(),
        Some(TypeKey::Array { element, rank }) => {
            let commas = ",".repeat(rank.saturating_sub(1) as usize);
            format!("{}[{}]", format_type(db, element), commas)
        }
        Some(TypeKey::Nullable(underlying)) => format!("{}?", format_type(db, underlying)),
        Some(TypeKey::Tuple(list_id)) => {
            let elements = db.tuple_list(list_id);
            let rendered: Vec<String> = elements
                .iter()
                .map(|element| match element.name {
                    Some(name) => format!(
                        "{} {}",
                        format_type(db, element.type_id),
                        db.resolve_name(name)
                    ),
                    None => format_type(db, element.type_id),
                })
                .collect();
            format!("({})", rendered.join(", "))
        }
        Some(TypeKey::Named(app_id)) => {
            let Some(app) = db.application(app_id) else {
                return "<invalid>".to_string();
            };
            let name = db
                .definition(app.def)
                .map(|def| db.resolve_name(def.name).to_string())
                .unwrap_or_else(|| "<invalid>".to_string());
            if app.args.is_empty() {
                name
            } else {
                let args: Vec<String> = app
                    .args
                    .iter()
                    .map(|&arg| format_type(db, arg))
                    .collect();
                format!("{}<{}>", name, args.join(", "))
            }
        }
        Some(TypeKey::Delegate(shape_id)) => {
            let Some(shape) = db.function_shape(shape_id) else {
                return "<invalid>".to_string();
            };
            let params: Vec<String> = shape
                .params
                .iter()
                .map(|param| {
                    let ty = format_type(db, param.type_id);
                    match param.ref_kind {
                        RefKind::Value => ty,
                        RefKind::Ref => format!("ref {ty}"),
                        RefKind::Out => format!("out {ty}"),
                        RefKind::In => format!("in {ty}"),
                    }
                })
                .collect();
            format!(
                "({}) -> {}",
                params.join(", "),
                format_type(db, shape.return_type)
            )
        }
        Some(TypeKey::TypeParameter(info)) => db.resolve_name(info.name).to_string(),
        // A named placeholder keeps the type parameter's spelling so
        // downstream diagnostics can show what failed to infer.
        Some(TypeKey::Error(Some(name))) => db.resolve_name(name).to_string(),
        Some(TypeKey::Error(None)) => "<error>".to_string(),
    }
}

fn intrinsic_name(kind: IntrinsicKind) -> &'static str {
    match kind {
        IntrinsicKind::Void => "void",
        IntrinsicKind::Object => "object",
        IntrinsicKind::Dynamic => "dynamic",
        IntrinsicKind::Bool => "bool",
        IntrinsicKind::Char => "char",
        IntrinsicKind::SByte => "sbyte",
        IntrinsicKind::Byte => "byte",
        IntrinsicKind::Short => "short",
        IntrinsicKind::UShort => "ushort",
        IntrinsicKind::Int => "int",
        IntrinsicKind::UInt => "uint",
        IntrinsicKind::Long => "long",
        IntrinsicKind::ULong => "ulong",
        IntrinsicKind::Float => "float",
        IntrinsicKind::Double => "double",
        IntrinsicKind::Decimal => "decimal",
        IntrinsicKind::String => "string",
    }
}
