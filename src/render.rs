//! Compose a badge grid into a single SVG document.

use crate::error::AppError;
use crate::icons::IconFetcher;
use crate::models::BadgeRecord;

pub const BADGES_PER_ROW: usize = 2;
pub const ROW_HEIGHT: usize = 120;
pub const COLUMN_WIDTH: usize = 400;
pub const CANVAS_WIDTH: usize = 800;

const BADGE_CAPTION: &str = "LeetCode Badge";
const UNKNOWN_BADGE: &str = "Unknown Badge";

/// Canvas height for `count` badges; never shorter than one row.
pub fn canvas_height(count: usize) -> usize {
    let rows = count.div_ceil(BADGES_PER_ROW);
    (ROW_HEIGHT * rows).max(ROW_HEIGHT)
}

/// Top-left corner of the cell holding the badge at `index`.
pub fn cell_origin(index: usize) -> (usize, usize) {
    let row = index / BADGES_PER_ROW;
    let col = index % BADGES_PER_ROW;
    (col * COLUMN_WIDTH, row * ROW_HEIGHT)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the document from badges whose icons are already resolved to data URIs.
pub fn compose_svg(cells: &[(&BadgeRecord, Option<String>)]) -> String {
    let height = canvas_height(cells.len());
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}">
  <rect x="0" y="0" width="{w}" height="{h}" fill="#ffffff"/>"##,
        w = CANVAS_WIDTH,
        h = height
    );

    for (index, (badge, icon)) in cells.iter().enumerate() {
        let (x, y) = cell_origin(index);
        let name = if badge.display_name.is_empty() {
            UNKNOWN_BADGE
        } else {
            badge.display_name.as_str()
        };

        svg.push_str(&format!(
            r##"
  <g transform="translate({x}, {y})">
    <rect x="10" y="10" width="380" height="100" fill="#f0f0f0" rx="10"/>
    <text x="20" y="35" font-family="Arial" font-size="16" fill="#333">{name}</text>
    <text x="20" y="65" font-family="Arial" font-size="14" fill="#666">Earned: {date}</text>
    <text x="20" y="90" font-family="Arial" font-size="12" fill="#999">{caption}</text>"##,
            x = x,
            y = y,
            name = escape_xml(name),
            date = escape_xml(&badge.creation_date),
            caption = BADGE_CAPTION,
        ));

        if let Some(data_uri) = icon {
            svg.push_str(&format!(
                r#"
    <image x="320" y="25" width="50" height="50" xlink:href="{}"/>"#,
                data_uri
            ));
        }

        svg.push_str("\n  </g>");
    }

    svg.push_str("\n</svg>");
    svg
}

/// Stdout line for a failed icon fetch. A non-success status is only logged.
fn icon_failure_message(error: &AppError) -> Option<String> {
    match error {
        AppError::HttpStatus(_) => None,
        other => Some(format!("Error downloading icon: {}", other)),
    }
}

pub struct BadgeRenderer<'a> {
    icons: &'a dyn IconFetcher,
    base_url: &'a str,
    animated: bool,
}

impl<'a> BadgeRenderer<'a> {
    pub fn new(icons: &'a dyn IconFetcher, base_url: &'a str, animated: bool) -> Self {
        Self {
            icons,
            base_url,
            animated,
        }
    }

    fn icon_url<'b>(&self, badge: &'b BadgeRecord) -> &'b str {
        if self.animated {
            &badge.medal.config.icon_gif
        } else {
            &badge.icon
        }
    }

    /// Fetch the badge's icon as a data URI. Failures only drop the icon.
    async fn resolve_icon(&self, badge: &BadgeRecord) -> Option<String> {
        let url = self.icon_url(badge);
        if url.is_empty() || url == self.base_url {
            return None;
        }

        match self.icons.fetch_icon(url).await {
            Ok(icon) => Some(icon.to_data_uri()),
            Err(e) => {
                tracing::warn!(%url, badge = %badge.id, error = %e, "icon fetch failed");
                if let Some(message) = icon_failure_message(&e) {
                    println!("{}", message);
                }
                None
            }
        }
    }

    /// Render all badges in input order, fetching icons one at a time.
    pub async fn render(&self, badges: &[BadgeRecord]) -> String {
        let mut cells = Vec::with_capacity(badges.len());
        for badge in badges {
            let icon = self.resolve_icon(badge).await;
            cells.push((badge, icon));
        }
        compose_svg(&cells)
    }
}
