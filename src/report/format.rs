//! Value formatting for the dashboard (pt-BR conventions).

/// Format an amount as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format_decimal_br(value))
}

/// Format an amount with two decimals, `.` for thousands and `,` for cents.
pub fn format_decimal_br(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let units = cents / 100;
    let fraction = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02}", sign, grouped, fraction)
}

/// Format a percentage rounded to an integer, e.g. `33%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// Format a day count without a trailing `.0` for whole numbers.
pub fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{}", days as i64)
    } else {
        format_decimal_br(days)
    }
}

/// Percent-encode a query value the way browsers' `encodeURIComponent` does.
pub fn encode_uri_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(350.0), "R$ 350,00");
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(999.999), "R$ 1.000,00");
        assert_eq!(format_brl(0.1 + 0.2), "R$ 0,30");
    }

    #[test]
    fn test_format_decimal_negative() {
        assert_eq!(format_decimal_br(-1500.5), "-1.500,50");
        assert_eq!(format_decimal_br(-0.001), "0,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(100.0 / 3.0), "33%");
        assert_eq!(format_percent(66.6667), "67%");
        assert_eq!(format_percent(12.5), "13%");
        assert_eq!(format_percent(100.0), "100%");
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_days(2.0), "2");
        assert_eq!(format_days(2.5), "2,50");
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("Ana"), "Ana");
        assert_eq!(encode_uri_component("Ana Souza"), "Ana%20Souza");
        assert_eq!(encode_uri_component("João"), "Jo%C3%A3o");
        assert_eq!(encode_uri_component("a&b=c/d?"), "a%26b%3Dc%2Fd%3F");
        assert_eq!(encode_uri_component("O'Neil (jr.)"), "O'Neil%20(jr.)");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Zé" & 'Cia'</b>"#),
            "&lt;b&gt;&quot;Zé&quot; &amp; &#39;Cia&#39;&lt;/b&gt;"
        );
    }
}
