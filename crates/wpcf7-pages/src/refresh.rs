//! Captcha and quiz refresh from `captcha`/`quiz` response maps.

use crate::markers::wrap_selector;
use crate::state::FormHandle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use wpcf7_dom::Selector;

static CHALLENGE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"([0-9]+)\.(png|gif|jpeg)$").expect("valid challenge pattern"));

#[derive(Debug, Default, Deserialize)]
struct Refill {
	#[serde(default)]
	captcha: Option<BTreeMap<String, String>>,
	#[serde(default)]
	quiz: Option<BTreeMap<String, (String, String)>>,
}

/// Applies the `captcha` and `quiz` maps of an API response, if present.
pub fn refresh_from_response(form: &FormHandle, response: &Value) {
	let refill: Refill = match serde_json::from_value(response.clone()) {
		Ok(refill) => refill,
		Err(e) => {
			tracing::warn!(form = form.id(), error = %e, "ignoring malformed captcha/quiz refill");
			return;
		}
	};
	if let Some(captcha) = &refill.captcha {
		reset_captcha(form, captcha);
	}
	if let Some(quiz) = &refill.quiz {
		reset_quiz(form, quiz);
	}
}

/// Clears each captcha answer, swaps the image and updates the challenge
/// field with the number from the image file name.
pub fn reset_captcha(form: &FormHandle, refill: &BTreeMap<String, String>) {
	let mut doc = form.dom().borrow_mut();
	for (name, url) in refill {
		for input in doc.query_all(form.node(), &Selector::tag("input").and(Selector::attr_eq("name", name.as_str()))) {
			doc.set_value(input, "");
		}

		let image_class = format!("wpcf7-captcha-{}", name.replace(':', ""));
		for image in doc.query_all(form.node(), &Selector::tag("img").and(Selector::class(image_class))) {
			doc.set_attr(image, "src", url);
		}

		if let Some(challenge) = CHALLENGE.captures(url).and_then(|c| c.get(1)) {
			let field = format!("_wpcf7_captcha_challenge_{name}");
			for input in doc.query_all(form.node(), &Selector::tag("input").and(Selector::attr_eq("name", field))) {
				doc.set_value(input, challenge.as_str());
			}
		}
	}
}

/// Clears each quiz answer and installs the new question and answer hash.
pub fn reset_quiz(form: &FormHandle, refill: &BTreeMap<String, (String, String)>) {
	let mut doc = form.dom().borrow_mut();
	for (name, (question, hashed_answer)) in refill {
		let answer_field = format!("_wpcf7_quiz_answer_{name}");
		for wrap in doc.query_all(form.node(), &wrap_selector(name)) {
			if let Some(input) = doc.query(wrap, &Selector::tag("input").and(Selector::attr_eq("name", name.as_str()))) {
				doc.set_value(input, "");
			}
			if let Some(label) = doc.query(wrap, &Selector::class("wpcf7-quiz-label")) {
				let _ = doc.set_text_content(label, question);
			}
			if let Some(hidden) = doc.query(wrap, &Selector::tag("input").and(Selector::attr_eq("name", answer_field.as_str()))) {
				doc.set_value(hidden, hashed_answer);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use wpcf7_dom::{Document, Dom, NodeId, el};

	fn setup() -> (FormHandle, NodeId) {
		let mut doc = Document::new();
		let root = doc.root();
		let form = el("form")
			.child(el("input").name("captcha-1").value("old"))
			.child(el("img").class("wpcf7-captcha-captcha-1").attr("src", "old.png"))
			.child(el("input").input_type("hidden").name("_wpcf7_captcha_challenge_captcha-1").value("1"))
			.child(
				el("span")
					.class("wpcf7-form-control-wrap")
					.attr("data-name", "quiz-1")
					.child(el("span").class("wpcf7-quiz-label").text("2+2?"))
					.child(el("input").name("quiz-1").value("4"))
					.child(el("input").input_type("hidden").name("_wpcf7_quiz_answer_quiz-1").value("h1")),
			)
			.build_into(&mut doc, root)
			.unwrap();
		(FormHandle::new(Dom::new(doc), form), form)
	}

	fn value_of(form: &FormHandle, name: &str) -> String {
		let doc = form.dom().borrow();
		let node = doc.query(form.node(), &Selector::attr_eq("name", name)).unwrap();
		doc.value(node)
	}

	#[rstest]
	fn test_captcha_refresh() {
		let (form, node) = setup();

		refresh_from_response(&form, &json!({ "captcha": { "captcha-1": "https://example.com/tmp/48213.png" } }));

		assert_eq!(value_of(&form, "captcha-1"), "");
		assert_eq!(value_of(&form, "_wpcf7_captcha_challenge_captcha-1"), "48213");
		let doc = form.dom().borrow();
		let image = doc.query(node, &Selector::tag("img")).unwrap();
		assert_eq!(doc.attr(image, "src"), Some("https://example.com/tmp/48213.png"));
	}

	#[rstest]
	fn test_quiz_refresh() {
		let (form, node) = setup();

		refresh_from_response(&form, &json!({ "quiz": { "quiz-1": ["3+3?", "h2"] } }));

		assert_eq!(value_of(&form, "quiz-1"), "");
		assert_eq!(value_of(&form, "_wpcf7_quiz_answer_quiz-1"), "h2");
		let doc = form.dom().borrow();
		let label = doc.query(node, &Selector::class("wpcf7-quiz-label")).unwrap();
		assert_eq!(doc.text_content(label), "3+3?");
	}

	#[rstest]
	fn test_response_without_maps_changes_nothing() {
		let (form, _) = setup();
		refresh_from_response(&form, &json!({ "status": "mail_sent" }));
		assert_eq!(value_of(&form, "captcha-1"), "old");
		assert_eq!(value_of(&form, "quiz-1"), "4");
	}
}
