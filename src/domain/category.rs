use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Tourism,
    Beaches,
    Restaurants,
    Shopping,
    Museums,
    Culture,
    History,
    ThingsToDo,
}

impl Category {
    /// All categories in declaration order. Inference ties resolve to the earlier entry.
    pub const ALL: [Category; 8] = [
        Category::Tourism,
        Category::Beaches,
        Category::Restaurants,
        Category::Shopping,
        Category::Museums,
        Category::Culture,
        Category::History,
        Category::ThingsToDo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tourism => "tourism",
            Category::Beaches => "beaches",
            Category::Restaurants => "restaurants",
            Category::Shopping => "shopping",
            Category::Museums => "museums",
            Category::Culture => "culture",
            Category::History => "history",
            Category::ThingsToDo => "things-to-do",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tourism" => Ok(Category::Tourism),
            "beaches" => Ok(Category::Beaches),
            "restaurants" => Ok(Category::Restaurants),
            "shopping" => Ok(Category::Shopping),
            "museums" => Ok(Category::Museums),
            "culture" => Ok(Category::Culture),
            "history" => Ok(Category::History),
            "things-to-do" | "things_to_do" | "things to do" => Ok(Category::ThingsToDo),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Serialized through the string form so config files can use "things-to-do".
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
