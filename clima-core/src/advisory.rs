//! Rule-based advisories derived from a single observation.
//!
//! Every dimension is an ordered band table evaluated top to bottom; the first
//! band whose predicate holds supplies the message. All functions are total.

use serde::Serialize;

use crate::model::WeatherObservation;

/// One row of a classification table.
struct Band<T> {
    matches: fn(T) -> bool,
    message: &'static str,
}

fn classify<T: Copy>(bands: &[Band<T>], value: T, fallback: &'static str) -> &'static str {
    bands
        .iter()
        .find(|band| (band.matches)(value))
        .map_or(fallback, |band| band.message)
}

pub const NO_RECOMMENDATION: &str = "No hay recomendaciones disponibles.";

const CONDITION_BANDS: &[Band<i32>] = &[
    Band {
        matches: |c| c < 300,
        message: "⚡ Tormenta eléctrica. ¡Mantente a salvo y evita áreas abiertas!",
    },
    Band {
        matches: |c| c < 400,
        message: "🌦️ Llovizna ligera. Revisa el clima futuro.",
    },
    Band {
        matches: |c| c == 500,
        message: "🌧️ Lluvia ligera. Cambios de clima en próximas horas.",
    },
    Band {
        matches: |c| c == 501,
        message: "🌧️ Lluvia moderada. Cambios de clima en próximas horas.",
    },
    Band {
        matches: |c| c == 502,
        message: "🌧️ Lluvia intensa. Lleva paraguas y ropa impermeable.",
    },
    Band {
        matches: |c| c == 503,
        message: "🌧️ Lluvia muy intensa. Mejor no salgas.",
    },
    Band {
        matches: |c| c == 504,
        message: "🌧️ Lluvia extrema. ¡No salgas!",
    },
    Band {
        matches: |c| c == 511,
        message: "❄️ Lluvia helada. Cuidado con superficies resbaladizas.",
    },
    Band {
        matches: |c| c == 520,
        message: "🌦️ Lluvia ligera corta. Cambios de clima en próximas horas.",
    },
    Band {
        matches: |c| c == 521,
        message: "🌦️ Lluvia moderada corta. Cambios de clima en próximas horas.",
    },
    Band {
        matches: |c| c == 522,
        message: "🌧️ Lluvia intensa corta. Lleva paraguas y ropa impermeable.",
    },
    Band {
        matches: |c| c == 531,
        message: "🌧️ Lluvia irregular. Lleva paraguas y ropa impermeable.",
    },
    Band {
        matches: |c| (600..=622).contains(&c),
        message: "❄️ Nieve. Mantente abrigado y ten cuidado al conducir.",
    },
    Band {
        matches: |c| (701..800).contains(&c),
        message: "🌫️ Condiciones atmosféricas adversas. Precaución al conducir.",
    },
    Band {
        matches: |c| c == 800,
        message: "☀️ Cielo despejado. ¡Disfruta tu día!",
    },
    Band {
        matches: |c| c == 801,
        message: "🌤️ Algunas nubes. Probablemente no necesites paraguas.",
    },
    Band {
        matches: |c| c == 802,
        message: "⛅ Parcialmente nublado. Probablemente no necesites paraguas.",
    },
    Band {
        matches: |c| c == 803,
        message: "🌥️ Mayormente nublado. Puede que necesites paraguas.",
    },
    Band {
        matches: |c| c == 804,
        message: "☁️ Completamente nublado. Lleva paraguas.",
    },
];

const PRESSURE_BANDS: &[Band<i32>] = &[
    Band {
        matches: |hpa| hpa > 1020,
        message: "Alta presión atmosférica. Día seco.",
    },
    Band {
        matches: |hpa| hpa < 1013,
        message: "Baja presión atmosférica. Puede haber mal tiempo.",
    },
];

const HUMIDITY_BANDS: &[Band<u8>] = &[
    Band {
        matches: |pct| pct > 70,
        message: "Humedad alta. Puede sentirse más caliente de lo normal.",
    },
    Band {
        matches: |pct| pct < 30,
        message: "Humedad baja. Aire seco, poca probabilidad de lluvia.",
    },
];

const UV_BANDS: &[Band<f64>] = &[
    Band {
        matches: |uvi| uvi > 7.0,
        message: "Índice UV alto. Usa protector solar y evita el sol directo.",
    },
    Band {
        matches: |uvi| uvi > 3.0,
        message: "Índice UV moderado. Usa protector solar si estarás mucho tiempo afuera.",
    },
];

const CLOUD_BANDS: &[Band<u8>] = &[
    Band {
        matches: |pct| pct < 20,
        message: "Cielo despejado. Disfruta del sol y el aire fresco.",
    },
    Band {
        matches: |pct| pct < 50,
        message: "Cielo parcialmente nublado. Probablemente no necesites paraguas.",
    },
    Band {
        matches: |pct| pct < 80,
        message: "Cielo nublado. Puede que necesites paraguas.",
    },
];

const DEW_POINT_BANDS: &[Band<f64>] = &[
    Band {
        matches: |c| c > 20.0,
        message: "Punto de rocío alto. Puede sentirse más caliente de lo normal.",
    },
    Band {
        matches: |c| c > 10.0,
        message: "Punto de rocío normal. El clima es cómodo.",
    },
    Band {
        matches: |c| c > 0.0,
        message: "Punto de rocío bajo. Aire seco, poca probabilidad de lluvia.",
    },
];

const SPREAD_BANDS: &[Band<f64>] = &[
    Band {
        matches: |diff| diff > 10.0,
        message: "El clima es seco y cómodo.",
    },
    Band {
        matches: |diff| diff < 5.0,
        message: "El clima es húmedo y puede sentirse más caliente de lo normal.",
    },
];

// Inclusive lower bounds here, unlike the strict comparisons above.
const PRECIPITATION_BANDS: &[Band<f64>] = &[
    Band {
        matches: |pop| pop >= 0.8,
        message: "☔ Muy alta probabilidad de lluvia. Lleva paraguas y ropa impermeable.",
    },
    Band {
        matches: |pop| pop >= 0.5,
        message: "🌦️ Probabilidad moderada de lluvia. Considera llevar paraguas.",
    },
    Band {
        matches: |pop| pop >= 0.2,
        message: "🌦️ Baja probabilidad de lluvia. Probablemente no necesites paraguas.",
    },
];

pub const NO_RAIN_EXPECTED: &str = "🌤️ No se espera lluvia. Disfruta tu día.";

pub const SUNSCREEN: &str = "🧴 Usa protector solar, el índice UV es alto.";
pub const HOT: &str = "🥵 Hace calor, mantente hidratado.";
pub const COLD: &str = "🧥 Hace frío, abrígate bien.";
pub const MUGGY: &str = "💧 Humedad alta, puede sentirse bochornoso.";
pub const PLEASANT: &str = "✅ El clima es agradable, ¡disfruta tu día!";

const PRESSURE_NORMAL: &str = "Presión atmosférica normal. El clima suele ser estable.";
const HUMIDITY_NORMAL: &str = "Humedad normal. El clima es cómodo.";
const UV_LOW: &str = "Índice UV bajo. Puedes disfrutar del sol sin preocupaciones.";
const CLOUDS_HEAVY: &str = "Cielo muy nublado. Lleva paraguas por si acaso.";
const DEW_POINT_VERY_LOW: &str =
    "Punto de rocío muy bajo. Aire muy seco, poca probabilidad de lluvia.";
const SPREAD_MILD: &str = "El clima es ligeramente húmedo.";
const RAIN_VERY_UNLIKELY: &str = "🌤️ Muy baja probabilidad de lluvia. Disfruta tu día.";

/// Message for a provider condition code; absent codes get the fallback.
pub fn condition_message(code: Option<i32>) -> &'static str {
    match code {
        Some(code) => classify(CONDITION_BANDS, code, NO_RECOMMENDATION),
        None => NO_RECOMMENDATION,
    }
}

pub fn pressure_message(hpa: i32) -> &'static str {
    classify(PRESSURE_BANDS, hpa, PRESSURE_NORMAL)
}

pub fn humidity_message(pct: u8) -> &'static str {
    classify(HUMIDITY_BANDS, pct, HUMIDITY_NORMAL)
}

pub fn uv_message(uvi: f64) -> &'static str {
    classify(UV_BANDS, uvi, UV_LOW)
}

pub fn clouds_message(pct: u8) -> &'static str {
    classify(CLOUD_BANDS, pct, CLOUDS_HEAVY)
}

pub fn dew_point_message(dew_point_c: f64) -> &'static str {
    classify(DEW_POINT_BANDS, dew_point_c, DEW_POINT_VERY_LOW)
}

/// Comfort message from the gap between temperature and dew point.
///
/// Returns an empty string when either value is unknown.
pub fn dew_point_spread_message(
    temperature_c: Option<f64>,
    dew_point_c: Option<f64>,
) -> &'static str {
    match (temperature_c, dew_point_c) {
        (Some(temp), Some(dew)) => classify(SPREAD_BANDS, temp - dew, SPREAD_MILD),
        _ => "",
    }
}

pub fn precipitation_message(pop: f64) -> &'static str {
    classify(PRECIPITATION_BANDS, pop, RAIN_VERY_UNLIKELY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryCategory {
    Condition,
    Precipitation,
    UvIndex,
    Pressure,
    Humidity,
    CloudCover,
    DewPoint,
    DewPointSpread,
    Comfort,
}

impl AdvisoryCategory {
    /// Short Spanish label used in terminal and report output.
    pub fn label(&self) -> &'static str {
        match self {
            AdvisoryCategory::Condition => "Recomendación",
            AdvisoryCategory::Precipitation => "Prob. de precipitación",
            AdvisoryCategory::UvIndex => "Índice UV",
            AdvisoryCategory::Pressure => "Presión",
            AdvisoryCategory::Humidity => "Humedad",
            AdvisoryCategory::CloudCover => "Nubes",
            AdvisoryCategory::DewPoint => "Punto de rocío",
            AdvisoryCategory::DewPointSpread => "Diferencia temp/punto de rocío",
            AdvisoryCategory::Comfort => "Consejo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub category: AdvisoryCategory,
    pub message: &'static str,
}

/// Ordered advisories for one observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AdvisorySet(Vec<Advisory>);

impl AdvisorySet {
    fn push(&mut self, category: AdvisoryCategory, message: &'static str) {
        if !message.is_empty() {
            self.0.push(Advisory { category, message });
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Advisory> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `category`, if any.
    pub fn get(&self, category: AdvisoryCategory) -> Option<&'static str> {
        self.0
            .iter()
            .find(|a| a.category == category)
            .map(|a| a.message)
    }

    pub fn messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|a| a.message)
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|a| a.message == message)
    }
}

impl<'a> IntoIterator for &'a AdvisorySet {
    type Item = &'a Advisory;
    type IntoIter = std::slice::Iter<'a, Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// All advisories for one observation, in display order.
pub fn advise(obs: &WeatherObservation) -> AdvisorySet {
    let mut set = AdvisorySet::default();

    let precipitation = obs
        .precipitation_probability()
        .map_or(NO_RAIN_EXPECTED, precipitation_message);

    set.push(
        AdvisoryCategory::Condition,
        condition_message(obs.condition_code()),
    );
    set.push(AdvisoryCategory::Precipitation, precipitation);
    if let Some(uvi) = obs.uv_index() {
        set.push(AdvisoryCategory::UvIndex, uv_message(uvi));
    }
    set.push(
        AdvisoryCategory::Pressure,
        pressure_message(obs.pressure_hpa()),
    );
    set.push(
        AdvisoryCategory::Humidity,
        humidity_message(obs.humidity_pct()),
    );
    if let Some(clouds) = obs.cloud_pct() {
        set.push(AdvisoryCategory::CloudCover, clouds_message(clouds));
    }
    if let Some(dew) = obs.dew_point_c() {
        set.push(AdvisoryCategory::DewPoint, dew_point_message(dew));
    }
    set.push(
        AdvisoryCategory::DewPointSpread,
        dew_point_spread_message(Some(obs.temperature_c()), obs.dew_point_c()),
    );

    for message in comfort_messages(obs) {
        set.push(AdvisoryCategory::Comfort, message);
    }

    set
}

/// Everyday tips: sunscreen, heat, cold and mugginess, or a pleasant-day note.
pub fn comfort_messages(obs: &WeatherObservation) -> Vec<&'static str> {
    let mut tips = Vec::new();

    if obs.uv_index().is_some_and(|uvi| uvi >= 6.0) {
        tips.push(SUNSCREEN);
    }
    if obs.temperature_c() >= 30.0 {
        tips.push(HOT);
    }
    if obs.temperature_c() <= 5.0 {
        tips.push(COLD);
    }
    if obs.humidity_pct() >= 80 {
        tips.push(MUGGY);
    }
    if tips.is_empty() {
        tips.push(PLEASANT);
    }

    tips
}

/// Temperatures in the order given, for the trend chart.
pub fn trend(observations: &[WeatherObservation]) -> Vec<f64> {
    observations
        .iter()
        .map(WeatherObservation::temperature_c)
        .collect()
}
