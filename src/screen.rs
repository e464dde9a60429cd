//! List screens and their endpoint bindings.

use std::fmt;
use std::str::FromStr;

use crate::api::QueryParams;
use crate::routing::RouteParams;

/// Kinds of collections, each with its own endpoint and status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionType {
    Returned,
    #[default]
    Money,
    Dispatched,
    Driver,
}

impl CollectionType {
    pub const ALL: [CollectionType; 4] = [
        CollectionType::Returned,
        CollectionType::Money,
        CollectionType::Dispatched,
        CollectionType::Driver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Returned => "returned",
            CollectionType::Money => "money",
            CollectionType::Dispatched => "dispatched",
            CollectionType::Driver => "driver",
        }
    }

    /// The next type, wrapping around.
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl FromStr for CollectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown collection type '{}'", s))
    }
}

/// A list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Orders,
    Collections(CollectionType),
    Complaints,
}

impl Screen {
    /// The resource segment below `/api/`.
    pub fn resource(&self) -> &'static str {
        match self {
            Screen::Orders => "orders",
            Screen::Collections(_) => "collections",
            Screen::Complaints => "complaints",
        }
    }

    /// The endpoint path below `/api/`, including the collection type.
    pub fn endpoint(&self) -> String {
        match self {
            Screen::Collections(kind) => format!("{}/{}", self.resource(), kind.as_str()),
            _ => self.resource().to_string(),
        }
    }

    /// Label key for the screen title.
    pub fn title_key(&self) -> &'static str {
        match self {
            Screen::Orders => "screen.orders",
            Screen::Collections(_) => "screen.collections",
            Screen::Complaints => "screen.complaints",
        }
    }

    /// The navigation parameter carrying an externally supplied ID list, and
    /// the query key it is forwarded as.
    pub fn id_list_binding(&self) -> Option<IdListBinding> {
        match self {
            Screen::Orders => Some(IdListBinding {
                route_param: "orderIds",
                query_key: "order_ids",
            }),
            Screen::Collections(_) => Some(IdListBinding {
                route_param: "collectionIds",
                query_key: "collection_ids",
            }),
            Screen::Complaints => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint())
    }
}

/// Maps a navigation parameter to a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdListBinding {
    pub route_param: &'static str,
    pub query_key: &'static str,
}

/// Everything screen-specific a list controller needs: which endpoint to call
/// and which extra parameters to append to every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBinding {
    screen: Screen,
    business_user_id: Option<String>,
}

impl ScreenBinding {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            business_user_id: None,
        }
    }

    /// Scope complaint lists to a business account.
    pub fn with_business_user(mut self, id: Option<String>) -> Self {
        self.business_user_id = id;
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn endpoint(&self) -> String {
        self.screen.endpoint()
    }

    /// Read this screen's ID-list parameter from the navigation context.
    pub fn read_id_list(&self, route: &dyn RouteParams) -> Option<String> {
        self.screen
            .id_list_binding()
            .and_then(|binding| route.get_param(binding.route_param))
    }

    /// Append the screen-specific parameters.
    pub fn append_extras(&self, query: &mut QueryParams, id_list: Option<&str>) {
        if let (Some(binding), Some(ids)) = (self.screen.id_list_binding(), id_list) {
            query.push(binding.query_key, ids);
        }

        if let (Screen::Complaints, Some(id)) = (self.screen, &self.business_user_id) {
            query.push("business_user_id", id.as_str());
        }
    }
}
