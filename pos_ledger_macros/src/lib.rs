mod entity;

use proc_macro::TokenStream;

/// Derive macro implementing `pos_ledger::Entity` for a record body struct.
///
/// # Struct attributes
/// - `#[entity(kind = "account")]`: the single record kind stored for this body.
/// - `#[entity(kinds = "asset, liability, equity")]`: several kinds sharing one body.
///   The caller picks one on create.
/// - `#[entity(name = "...", plural = "...")]`: envelope keys. Default to the
///   lowerCamelCase struct name and that name plus `s`.
///
/// # Field attributes
/// - `#[entity(date)]`: the business date used by date-range selectors. The field
///   may be a timestamp or an optional timestamp.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Entity)]
/// #[serde(rename_all = "camelCase")]
/// #[entity(kind = "expense")]
/// pub struct Expense {
///     pub description: String,
///     pub amount: Decimal,
///     #[entity(date)]
///     pub date: Timestamp,
///     pub account: String,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}
