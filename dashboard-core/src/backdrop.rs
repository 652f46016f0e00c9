//! Background artwork keyed by the provider's condition text.
//!
//! The provider does not promise stable condition strings, so this is an
//! exact-match table with a mandatory default. "Partly cloudy" and friends
//! land on the default on purpose; extend the table rather than fuzzing the match.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Backdrop {
    pub image: &'static str,
    pub gradient: &'static str,
}

const CLEAR: Backdrop = Backdrop {
    image: "https://media.giphy.com/media/xT9IgzoPDWknR7nVZK/giphy-downsized.gif",
    gradient: "from-blue-300 to-blue-500",
};

const SUNNY: Backdrop = Backdrop {
    image: "https://images.unsplash.com/photo-1507525428034-b723cf961d3e?auto=format&fit=crop&w=1920&q=80",
    gradient: "from-yellow-200 to-orange-400",
};

const CLOUDY: Backdrop = Backdrop {
    image: "https://media.giphy.com/media/xT9Igu0xJ9zJ3zJ3zJ/giphy-downsized.gif",
    gradient: "from-gray-300 to-gray-500",
};

const RAIN: Backdrop = Backdrop {
    image: "https://media.giphy.com/media/xT9IgG2lP0XJ0Z0Z0Z/giphy-downsized.gif",
    gradient: "from-blue-400 to-gray-600",
};

const SNOW: Backdrop = Backdrop {
    image: "https://media.giphy.com/media/3o7btPCcdNniyf0ArS/giphy-downsized.gif",
    gradient: "from-blue-100 to-gray-200",
};

pub const DEFAULT_BACKDROP: Backdrop = Backdrop {
    image: "https://images.unsplash.com/photo-1507525428034-b723cf961d3e?auto=format&fit=crop&w=1920&q=80",
    gradient: "from-gray-400 to-gray-700",
};

/// Look up the backdrop for a condition label. Unknown labels get [`DEFAULT_BACKDROP`].
pub fn resolve_backdrop(condition_text: &str) -> Backdrop {
    match condition_text {
        "Clear" => CLEAR,
        "Sunny" => SUNNY,
        "Cloudy" => CLOUDY,
        "Rain" => RAIN,
        "Snow" => SNOW,
        _ => DEFAULT_BACKDROP,
    }
}
