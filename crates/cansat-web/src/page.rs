//! HTML for the single results page.

use cansat_plot::InlineFigures;

const TITLE: &str = "CanSat Flight Simulation";

const STYLE: &str = "
    body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }
    h1, h2, h3 { color: #333; }
    img { border: 1px solid #ddd; margin: 10px 0 20px; max-width: 100%; height: auto; display: block; }
    p { color: #555; }
    pre { background-color: #f4f4f4; padding: 15px; border: 1px solid #ccc; overflow-x: auto; white-space: pre-wrap; word-wrap: break-word; }
    .container { max-width: 1040px; margin: auto; padding: 20px; }
";

/// Wrap a body fragment in the full document.
pub fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>{TITLE}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class=\"container\">
        <h1>{TITLE}</h1>
        {body}
    </div>
</body>
</html>
"
    )
}

pub fn results(apogee: f64, elevation: f64, figures: &InlineFigures) -> String {
    format!(
        "<h2>Simulation Complete</h2>\
         <p>Apogee: {apogee:.2} m above sea level ({:.2} m above the pad)</p>\
         <h3>Altitude and Vertical Velocity vs Time</h3>\
         <img src='data:image/png;base64,{}' alt='Altitude and vertical velocity vs time'>\
         <h3>3D Trajectory</h3>\
         <img src='data:image/png;base64,{}' alt='3D trajectory'>",
        apogee - elevation,
        figures.time_series,
        figures.trajectory
    )
}

/// Fragment for a run that produced nothing to plot.
pub fn no_results(apogee: f64, reason: &str) -> String {
    format!(
        "<p>Error: the simulation produced no plottable results ({}). Apogee: {apogee:.2} m</p>",
        escape_html(reason)
    )
}

/// Fragment for any other failure, with its cause chain.
pub fn failure(summary: &str, chain: &str) -> String {
    format!(
        "<h2>Simulation Error</h2><p>{}</p><pre>{}</pre>",
        escape_html(summary),
        escape_html(chain)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > 'd'"), "a &lt; b &amp;&amp; c &gt; &#39;d&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_results_fragment() {
        let figures = InlineFigures {
            time_series: "AAAA".into(),
            trajectory: "BBBB".into(),
        };
        let html = results(123.456, 20.0, &figures);
        assert!(html.contains("Apogee: 123.46 m above sea level (103.46 m above the pad)"));
        assert!(html.contains("<img src='data:image/png;base64,AAAA'"));
        assert!(html.contains("<img src='data:image/png;base64,BBBB'"));

        let order: Vec<usize> = ["Simulation Complete", "AAAA", "3D Trajectory", "BBBB"]
            .iter()
            .map(|needle| html.find(needle).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{html}");
    }

    #[test]
    fn test_document_wraps_body() {
        let page = document("<p>hello</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>CanSat Flight Simulation</title>"));
        assert!(page.contains("<p>hello</p>"));
    }

    #[test]
    fn test_failure_is_escaped() {
        let html = failure("bad <input>", "x\ncaused by: <y>");
        assert!(html.contains("<p>bad &lt;input&gt;</p>"));
        assert!(html.contains("<pre>x\ncaused by: &lt;y&gt;</pre>"));
    }
}
