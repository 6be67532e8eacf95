//! Domain types for the burger client.
//!
//! Catalog records and orders are produced by the remote service and are never
//! mutated locally. Field names on the wire follow the service (`_id`,
//! `createdAt`, ...); the Rust side uses snake case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Catalog identifier of an ingredient
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(String);

impl IngredientId {
    /// Creates a new `IngredientId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one ingredient placed in a draft
///
/// The same catalog ingredient may appear in a draft several times; each
/// placement gets its own instance id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Creates a new `InstanceId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ingredient category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    /// Top and bottom of the burger
    Bun,
    /// Sauce filling
    Sauce,
    /// Main filling
    Main,
}

impl fmt::Display for IngredientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Bun => "bun",
            Self::Sauce => "sauce",
            Self::Main => "main",
        })
    }
}

/// A purchasable ingredient from the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Catalog identifier
    #[serde(rename = "_id")]
    pub id: IngredientId,
    /// Display name
    pub name: String,
    /// Category
    #[serde(rename = "type")]
    pub kind: IngredientKind,
    /// Proteins per 100 g
    #[serde(default)]
    pub proteins: u32,
    /// Fat per 100 g
    #[serde(default)]
    pub fat: u32,
    /// Carbohydrates per 100 g
    #[serde(default)]
    pub carbohydrates: u32,
    /// Energy per 100 g
    #[serde(default)]
    pub calories: u32,
    /// Unit price
    pub price: u64,
    /// Image URL
    #[serde(default)]
    pub image: String,
    /// Large image URL
    #[serde(default)]
    pub image_large: String,
    /// Mobile image URL
    #[serde(default)]
    pub image_mobile: String,
}

impl Ingredient {
    /// Creates an ingredient with no nutrition facts or images
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: IngredientKind,
        price: u64,
    ) -> Self {
        Self {
            id: IngredientId::new(id),
            name: name.into(),
            kind,
            proteins: 0,
            fat: 0,
            carbohydrates: 0,
            calories: 0,
            price,
            image: String::new(),
            image_large: String::new(),
            image_mobile: String::new(),
        }
    }

    /// Whether this ingredient goes into the bun slot
    #[must_use]
    pub fn is_bun(&self) -> bool {
        self.kind == IngredientKind::Bun
    }
}

/// An ingredient placed in a draft
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIngredient {
    /// Identity of this placement
    pub instance_id: InstanceId,
    /// The catalog record, copied at insertion
    pub ingredient: Ingredient,
}

impl DraftIngredient {
    /// Catalog identifier of the placed ingredient
    #[must_use]
    pub const fn id(&self) -> &IngredientId {
        &self.ingredient.id
    }

    /// Unit price of the placed ingredient
    #[must_use]
    pub const fn price(&self) -> u64 {
        self.ingredient.price
    }
}

/// Public order number
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u64);

impl OrderNumber {
    /// Creates a new order number
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kitchen status of an order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted, not started
    Created,
    /// Being cooked
    Pending,
    /// Ready
    Done,
    /// A status this client does not know about
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Pending => write!(f, "pending"),
            Self::Done => write!(f, "done"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// An order as returned by the service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Service identifier
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Kitchen status
    #[serde(default)]
    pub status: OrderStatus,
    /// Burger name chosen by the service
    #[serde(default)]
    pub name: String,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last status change
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Public order number
    pub number: OrderNumber,
    /// Ingredient ids in build order, bun first and last
    #[serde(default, deserialize_with = "ingredient_refs")]
    pub ingredients: Vec<IngredientId>,
}

/// The submit endpoint echoes full ingredient records; everything else sends ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientRef {
    Id(IngredientId),
    Record {
        #[serde(rename = "_id")]
        id: IngredientId,
    },
}

fn ingredient_refs<'de, D>(deserializer: D) -> Result<Vec<IngredientId>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Vec::<IngredientRef>::deserialize(deserializer)?;
    Ok(refs
        .into_iter()
        .map(|reference| match reference {
            IngredientRef::Id(id) | IngredientRef::Record { id } => id,
        })
        .collect())
}

/// Profile of the signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Email address, unique per account
    pub email: String,
    /// Display name
    pub name: String,
}

/// Public order feed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Most recent orders
    pub orders: Vec<Order>,
    /// Orders placed since the service started
    pub total: u64,
    /// Orders placed today
    pub total_today: u64,
}

/// Registration form
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterData {
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for RegisterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterData")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login form
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginData {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Partial profile update; only the fields that are set are sent
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// New email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Set the new email address
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the new display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the new password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Credential pair issued by the service
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Short-lived bearer credential, sent verbatim in the `authorization` header
    pub access_token: String,
    /// Long-lived credential used to obtain a new access credential
    pub refresh_token: String,
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthTokens { .. }")
    }
}

/// Result of a successful registration or login
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Issued credentials
    #[serde(flatten)]
    pub tokens: AuthTokens,
    /// Profile of the signed-in user
    pub user: User,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn ingredient_reads_service_field_names() {
        let json = r#"{
            "_id": "643d69a5c3f7b9001cfa093c",
            "name": "Craterean bun N-200i",
            "type": "bun",
            "proteins": 80,
            "fat": 24,
            "carbohydrates": 53,
            "calories": 420,
            "price": 1255,
            "image": "https://code.s3.yandex.net/react/code/bun-02.png",
            "image_large": "https://code.s3.yandex.net/react/code/bun-02-large.png",
            "image_mobile": "https://code.s3.yandex.net/react/code/bun-02-mobile.png",
            "__v": 0
        }"#;

        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.id.as_str(), "643d69a5c3f7b9001cfa093c");
        assert_eq!(ingredient.kind, IngredientKind::Bun);
        assert_eq!(ingredient.price, 1255);
        assert!(ingredient.is_bun());
    }

    #[test]
    fn order_accepts_ids_or_records_and_unknown_status() {
        let json = r#"{
            "_id": "abc",
            "status": "cancelled",
            "name": "Space burger",
            "createdAt": "2025-01-01T10:00:00.000Z",
            "updatedAt": "2025-01-01T10:05:00.000Z",
            "number": 4242,
            "ingredients": ["B", {"_id": "X", "name": "Sauce"}, "B"]
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.number, OrderNumber::new(4242));
        assert_eq!(
            order.ingredients,
            vec![
                IngredientId::new("B"),
                IngredientId::new("X"),
                IngredientId::new("B")
            ]
        );
        assert!(order.created_at.is_some());
    }

    #[test]
    fn auth_response_flattens_tokens() {
        let json = r#"{
            "success": true,
            "accessToken": "Bearer abc",
            "refreshToken": "def",
            "user": {"email": "cook@example.com", "name": "Cook"}
        }"#;

        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tokens.access_token, "Bearer abc");
        assert_eq!(response.user.name, "Cook");
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let login = LoginData {
            email: "cook@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let update = ProfileUpdate::default().with_password("hunter2");

        assert!(!format!("{login:?}").contains("hunter2"));
        assert!(!format!("{update:?}").contains("hunter2"));
    }

    #[test]
    fn profile_update_sends_only_supplied_fields() {
        let update = ProfileUpdate::default().with_name("Chef");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "Chef"})
        );
    }
}
