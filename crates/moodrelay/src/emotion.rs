//! Weather condition to emotion mapping.

/// Emotion returned for any condition not in [`WEATHER_EMOTIONS`].
pub const FALLBACK_EMOTION: &str = "neutral";

/// Condition names as reported by the weather provider, paired with the
/// emotion they evoke.
pub const WEATHER_EMOTIONS: &[(&str, &str)] = &[
    ("Clear", "happy"),
    ("Sunny", "energetic"),
    ("Clouds", "calm"),
    ("Partly Cloudy", "thoughtful"),
    ("Overcast", "melancholic"),
    ("Rain", "sad"),
    ("Drizzle", "reflective"),
    ("Thunderstorm", "intense"),
    ("Snow", "peaceful"),
    ("Mist", "mysterious"),
    ("Fog", "introspective"),
    ("Haze", "dreamy"),
    ("Dust", "irritated"),
    ("Smoke", "anxious"),
    ("Tornado", "fearful"),
    ("Hurricane", "turbulent"),
];

/// Map a weather condition to an emotion label. Total: unknown conditions
/// map to [`FALLBACK_EMOTION`].
pub fn map_condition(condition: &str) -> &'static str {
    WEATHER_EMOTIONS
        .iter()
        .find(|(c, _)| *c == condition)
        .map(|(_, emotion)| *emotion)
        .unwrap_or(FALLBACK_EMOTION)
}
