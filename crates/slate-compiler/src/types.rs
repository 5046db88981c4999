//! Type names and signature keys.
//!
//! Types are plain strings: the primitive names below, user struct/class
//! names, and list types written `T[]`. A function's identity is its Call
//! ID, the name followed by its comma-joined parameter types.

pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const BOOL: &str = "bool";
pub const STRING: &str = "string";
pub const VOID: &str = "void";
pub const ANY: &str = "any";

/// The list type with elements of `element`.
pub fn list_of(element: &str) -> String {
    format!("{}[]", element)
}

/// The element type of a list type.
pub fn element_type(ty: &str) -> Option<&str> {
    ty.strip_suffix("[]")
}

/// Whether `ty` is a list type.
pub fn is_list(ty: &str) -> bool {
    ty.ends_with("[]")
}

/// Whether `ty` names a built-in type.
pub fn is_primitive(ty: &str) -> bool {
    matches!(ty, INT | FLOAT | BOOL | STRING | VOID | ANY)
}

/// Whether a value of type `found` may be used where `expected` is required.
///
/// `any` is compatible with everything in both directions.
pub fn compatible(expected: &str, found: &str) -> bool {
    if expected == found || expected == ANY || found == ANY {
        return true;
    }
    match (element_type(expected), element_type(found)) {
        (Some(e), Some(f)) => compatible(e, f),
        _ => false,
    }
}

/// The identity key of a function: `name,T1,T2,...`.
///
/// A zero-parameter function's Call ID is just its name.
pub fn call_id<I, S>(name: &str, param_types: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut id = name.to_string();
    for ty in param_types {
        id.push(',');
        id.push_str(ty.as_ref());
    }
    id
}

/// A human-readable signature: `name(T1, T2)`.
pub fn readable_signature<I, S>(name: &str, param_types: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let params: Vec<String> = param_types
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    format!("{}({})", name, params.join(", "))
}

/// The name part of a Call ID.
pub fn call_id_name(call_id: &str) -> &str {
    call_id.split(',').next().unwrap_or(call_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_ids() {
        assert_eq!(call_id("add", ["int", "int"]), "add,int,int");
        assert_eq!(call_id("main", Vec::<&str>::new()), "main");
        assert_eq!(call_id("math.abs", ["float"]), "math.abs,float");
        assert_eq!(call_id_name("math.abs,float"), "math.abs");
    }

    #[test]
    fn readable() {
        assert_eq!(readable_signature("add", ["int", "int"]), "add(int, int)");
        assert_eq!(readable_signature("f", Vec::<String>::new()), "f()");
    }

    #[test]
    fn lists() {
        assert_eq!(list_of("int"), "int[]");
        assert_eq!(element_type("int[][]"), Some("int[]"));
        assert_eq!(element_type("int"), None);
        assert!(is_list("Point[]"));
    }

    #[test]
    fn compatibility() {
        assert!(compatible("int", "int"));
        assert!(compatible("any", "Point"));
        assert!(compatible("int[]", "any[]"));
        assert!(!compatible("int", "float"));
        assert!(!compatible("int[]", "string[]"));
    }
}
