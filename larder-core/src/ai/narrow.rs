//! Cut fetched HTML down to the part most likely to hold the recipe.

use std::sync::LazyLock;

use regex::Regex;

static BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>.*</body>").expect("Invalid body regex"));

static MAIN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main[^>]*>.*</main>").expect("Invalid main regex"));

/// Narrow `html` to its `<body>` region, then to its `<main>` region.
///
/// Each step falls back to its input when the element is absent, so this never
/// fails. The matches are greedy: from the first opening tag to the last closing one.
pub fn narrow_html(html: &str) -> &str {
    let body = BODY_REGEX.find(html).map_or(html, |m| m.as_str());
    MAIN_REGEX.find(body).map_or(body, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_body_returns_input_unchanged() {
        let html = "<div>Just a fragment</div>";
        assert_eq!(narrow_html(html), html);
    }

    #[test]
    fn body_without_main_returns_body_region() {
        let html = "<html><head><title>x</title></head><BODY class=\"a\"><p>Soup</p></Body></html>";
        assert_eq!(narrow_html(html), "<BODY class=\"a\"><p>Soup</p></Body>");
    }

    #[test]
    fn main_inside_body_wins() {
        let html = "<html><body><nav>menu</nav><main id=\"r\">\n<h1>Daal</h1>\n</main><footer/></body></html>";
        assert_eq!(narrow_html(html), "<main id=\"r\">\n<h1>Daal</h1>\n</main>");
    }

    #[test]
    fn multiline_body_is_matched() {
        let html = "<html>\n<body>\nline one\nline two\n</body>\n</html>";
        assert_eq!(narrow_html(html), "<body>\nline one\nline two\n</body>");
    }
}
