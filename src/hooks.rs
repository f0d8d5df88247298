use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::utils::parse_bid_input;

/// Holds the state and callbacks for the JPY bid field.
///
/// The raw text is kept verbatim so the user can type freely; `value` holds
/// the parsed bid only while the text is a valid amount within the auction
/// limits, which is what gates the calculate action.
#[derive(Clone)]
pub struct BidInput {
    /// The current text content of the input field.
    pub text: String,
    /// The parsed bid, present only while the text is valid.
    pub value: Option<u64>,
    /// Callback for the input's `oninput` event.
    pub on_input: Callback<InputEvent>,
    /// Callback to programmatically set the bid, e.g. from a fresh
    /// prediction. Overwrites the text with the canonical form.
    pub set_value: Callback<u64>,
}

/// Custom hook managing the bid field's state.
#[hook]
pub fn use_bid_input() -> BidInput {
    let text_handle = use_state(String::new);

    let on_input = {
        let text_setter = text_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let set_value = {
        let text_setter = text_handle.clone();
        Callback::from(move |bid: u64| {
            text_setter.set(bid.to_string());
        })
    };

    BidInput {
        value: parse_bid_input(&text_handle).ok(),
        text: (*text_handle).clone(),
        on_input,
        set_value,
    }
}
