//! Server-rendered HTML pages.
use std::borrow::Cow;
use std::fmt::Write;

use crate::chart::slice_css;
use crate::models::{Poll, PollOption};

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
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
    Cow::Owned(out)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
         <style>table.results td {{ border: 1px solid #999; padding: 2px 8px; }} td.key {{ width: 1em; }}</style>\n\
         </head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

pub fn index(polls: &[Poll]) -> String {
    let mut body = String::from("<h1>Polls</h1>\n");
    if polls.is_empty() {
        body.push_str("<p>There are no polls yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for poll in polls {
            let _ = writeln!(
                body,
                "<li><a href=\"/poll?pollID={}\">{}</a></li>",
                poll.id,
                escape(&poll.title)
            );
        }
        body.push_str("</ul>\n");
    }

    page("Polls", &body)
}

/// Ballot page. `options` are expected in display order.
pub fn ballot(poll: &Poll, options: &[PollOption]) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<ol>\n",
        escape(&poll.title),
        escape(&poll.message)
    );
    for option in options {
        let _ = writeln!(
            body,
            "<li><a href=\"/vote?pollID={}&amp;optionID={}\">{}</a></li>",
            poll.id,
            option.id,
            escape(&option.option_title)
        );
    }
    body.push_str("</ol>\n<p><a href=\"/\">Back to polls</a></p>\n");

    page(&poll.title, &body)
}

/// Results page. `options` must be in the order the chart draws them, so
/// the colour key next to each row matches its wedge.
pub fn results(poll: &Poll, options: &[PollOption], winners: &[&PollOption]) -> String {
    let mut body = format!("<h1>Results: {}</h1>\n", escape(&poll.title));

    body.push_str("<table class=\"results\">\n<thead><tr><th></th><th>Option</th><th>Votes</th></tr></thead>\n<tbody>\n");
    for (index, option) in options.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td class=\"key\" style=\"background-color: {}\"></td><td>{}</td><td>{}</td></tr>",
            slice_css(index),
            escape(&option.option_title),
            option.votes_count
        );
    }
    body.push_str("</tbody>\n</table>\n");

    let _ = writeln!(
        body,
        "<h2>Chart</h2>\n<img alt=\"Pie chart\" src=\"/chart?pollID={id}\" width=\"400\" height=\"400\">\n\
         <h2>Spreadsheet</h2>\n<p><a href=\"/export?pollID={id}\">Download results</a></p>",
        id = poll.id
    );

    body.push_str("<h2>Winners</h2>\n<ul class=\"winners\">\n");
    for winner in winners {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&winner.option_link),
            escape(&winner.option_title)
        );
    }
    body.push_str("</ul>\n<p><a href=\"/\">Back to polls</a></p>\n");

    page(&poll.title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::option;

    fn poll() -> Poll {
        Poll {
            id: 3,
            title: "Rock & <Roll>".into(),
            message: "Pick \"one\"".into(),
        }
    }

    #[test]
    fn escape_only_allocates_when_needed() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape("a<b>&'\""), "a&lt;b&gt;&amp;&#39;&quot;");
    }

    #[test]
    fn index_links_each_poll() {
        let html = index(&[poll()]);
        assert!(html.contains("<a href=\"/poll?pollID=3\">Rock &amp; &lt;Roll&gt;</a>"));

        assert!(index(&[]).contains("There are no polls yet."));
    }

    #[test]
    fn ballot_links_to_vote() {
        let html = ballot(&poll(), &[option(9, "Elvis", 0)]);
        assert!(html.contains("/vote?pollID=3&amp;optionID=9"));
        assert!(html.contains("Pick &quot;one&quot;"));
    }

    #[test]
    fn results_show_table_chart_and_winners() {
        let options = vec![option(1, "Red", 4), option(2, "Blue", 1)];
        let html = results(&poll(), &options, &[&options[0]]);

        assert!(html.contains(&format!(
            "<td class=\"key\" style=\"background-color: {}\"></td><td>Red</td><td>4</td></tr>",
            slice_css(0)
        )));
        assert!(html.contains(&format!(
            "<td class=\"key\" style=\"background-color: {}\"></td><td>Blue</td><td>1</td></tr>",
            slice_css(1)
        )));
        assert!(html.contains("src=\"/chart?pollID=3\""));
        assert!(html.contains("href=\"/export?pollID=3\""));
        assert!(html.contains("<li><a href=\"https://example.com/1\">Red</a></li>"));
    }
}
