//! Case conversion: class names from the model become snake_case table
//! names and owner prefixes. Field names are used verbatim as columns.

/// Convert an identifier to snake_case.
/// e.g. "OrderItem" -> "order_item"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
