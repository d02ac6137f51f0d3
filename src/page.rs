use rust_decimal::Decimal;

use crate::form::ServerInfo;
use crate::service::History;

/// What the index page shows above the history table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice<'a> {
    None,
    Result(Decimal),
    Invalid(&'a str),
}

pub fn render(notice: Notice<'_>, history: &History, server: &ServerInfo) -> String {
    let mut html = String::with_capacity(2048);

    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
        "<meta charset=\"utf-8\">\n<title>Temperature converter</title>\n",
        "</head>\n<body>\n<h1>Temperature converter</h1>\n",
        "<form method=\"post\" action=\"/\">\n",
        "<input type=\"text\" name=\"valueRef\" placeholder=\"Value\">\n",
        "<select name=\"selectTemp\">\n",
        "<option value=\"1\">Celsius to Fahrenheit</option>\n",
        "<option value=\"2\">Fahrenheit to Celsius</option>\n",
        "</select>\n<button type=\"submit\">Convert</button>\n</form>\n",
    ));

    match notice {
        Notice::None => {}
        Notice::Result(value) => {
            html.push_str(&format!("<p class=\"result\">Result: {}</p>\n", value));
        }
        Notice::Invalid(message) => {
            html.push_str(&format!("<p class=\"error\">{}</p>\n", escape(message)));
        }
    }

    html.push_str("<h2>Latest conversions</h2>\n");
    match history {
        History::Unavailable => html.push_str("<p>History is currently unavailable.</p>\n"),
        History::Recent(records) if records.is_empty() => {
            html.push_str("<p>No conversions yet.</p>\n")
        }
        History::Recent(records) => {
            html.push_str(
                "<table>\n<tr><th>Original</th><th>Converted</th><th>Type</th><th>Time</th></tr>\n",
            );
            for record in records {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    record.original_value,
                    record.converted_value,
                    record.conversion_type,
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                ));
            }
            html.push_str("</table>\n");
        }
    }

    html.push_str(&format!(
        "<footer>{} v{}</footer>\n</body>\n</html>\n",
        escape(&server.machine),
        server.pkgversion
    ));

    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
