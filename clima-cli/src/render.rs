use clima_core::{IconSize, WeatherSnapshot, WorkflowState, icon_url};

const EMPTY_HINT: &str = "No data yet. Search a city or type :here to use your location.";
const ATTRIBUTION: &str = "Data: OpenWeatherMap";

/// Text view of the current lookup state.
pub fn render(state: &WorkflowState, icon_host: &str) -> String {
    match state {
        WorkflowState::Loading => "Loading...".to_string(),
        WorkflowState::Error(message) => message.clone(),
        WorkflowState::Empty => EMPTY_HINT.to_string(),
        WorkflowState::Ready(snapshot) => render_snapshot(snapshot, icon_host),
    }
}

fn render_snapshot(snapshot: &WeatherSnapshot, icon_host: &str) -> String {
    let mut lines = vec![snapshot.place()];

    let headline = match &snapshot.description {
        Some(desc) => format!("{}°C  {}", snapshot.temperature_c, capitalize_words(desc)),
        None => format!("{}°C", snapshot.temperature_c),
    };
    lines.push(headline);

    lines.push(format!(
        "Feels like {}°C · Humidity {}% · Wind {} m/s",
        snapshot.feels_like_c, snapshot.humidity_pct, snapshot.wind_speed_mps
    ));

    if let Some(code) = &snapshot.icon_code {
        lines.push(format!("Icon: {}", icon_url(icon_host, code, IconSize::Large)));
    }

    if let Some(at) = snapshot.observed_at {
        lines.push(format!("Observed {}", at.format("%Y-%m-%d %H:%M UTC")));
    }

    lines.push(ATTRIBUTION.to_string());
    lines.join("\n")
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn montevideo() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Montevideo".into(),
            country: Some("UY".into()),
            temperature_c: 19,
            feels_like_c: 18,
            description: Some("cielo claro".into()),
            icon_code: Some("01d".into()),
            humidity_pct: 70,
            wind_speed_mps: 3.2,
            observed_at: None,
        }
    }

    #[test]
    fn renders_ready_snapshot() {
        let out = render(&WorkflowState::Ready(montevideo()), "openweathermap.org");

        assert_eq!(
            out,
            "Montevideo, UY\n\
             19°C  Cielo Claro\n\
             Feels like 18°C · Humidity 70% · Wind 3.2 m/s\n\
             Icon: https://openweathermap.org/img/wn/01d@4x.png\n\
             Data: OpenWeatherMap"
        );
    }

    #[test]
    fn omits_absent_fields() {
        let snapshot = WeatherSnapshot {
            country: None,
            description: None,
            icon_code: None,
            observed_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap()),
            ..montevideo()
        };

        let out = render(&WorkflowState::Ready(snapshot), "openweathermap.org");
        assert!(out.starts_with("Montevideo\n19°C\n"));
        assert!(!out.contains("Icon:"));
        assert!(out.contains("Observed 2024-05-01 13:45 UTC"));
    }

    #[test]
    fn renders_other_states() {
        assert_eq!(render(&WorkflowState::Loading, "h"), "Loading...");
        assert_eq!(render(&WorkflowState::Error("network error".into()), "h"), "network error");
        assert_eq!(render(&WorkflowState::Empty, "h"), EMPTY_HINT);
    }

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("lluvia ligera"), "Lluvia Ligera");
        assert_eq!(capitalize_words("ñublado"), "Ñublado");
        assert_eq!(capitalize_words(""), "");
    }
}
