//! Locator lists and page scripts for the target site.

use super::locator::{Goal, Locator};

pub(super) const LOGIN_STATE_SCRIPT: &str = r#"
function visible(el) { return !!el && el.offsetParent !== null; }
function byXPath(x) {
    return document.evaluate(x, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
}
var loginForm = [
    document.querySelector("[name='email']"),
    document.querySelector("[name='pass']"),
    document.querySelector("[data-testid='royal_login_button']"),
    byXPath("//button[@name='login']")
];
if (loginForm.some(visible)) { return 'logged_out'; }
var account = [
    document.querySelector("[aria-label='Account']"),
    document.querySelector("[aria-label='Your profile']"),
    document.querySelector("[aria-label='Profile']"),
    byXPath("//a[contains(@href, '/me/')]"),
    document.querySelector("[role='navigation']"),
    byXPath("//span[contains(text(), \"What's on your mind\")]")
];
if (account.some(function (el) { return !!el; })) { return 'logged_in'; }
return 'unknown';
"#;

pub(super) const FEED_INDICATOR_SCRIPT: &str = r#"
function visible(el) { return !!el && el.offsetParent !== null; }
var mind = document.evaluate("//span[contains(text(), \"What's on your mind\")]", document, null,
    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
return [
    document.querySelector("[role='feed']"),
    document.querySelector("[aria-label='Stories']"),
    mind,
    document.querySelector("[role='article']"),
    document.querySelector("[role='main']")
].filter(visible).length;
"#;

pub(super) const SCROLL_BY_SCRIPT: &str = "window.scrollBy(0, arguments[0]);";
pub(super) const SCROLL_TOP_SCRIPT: &str = "window.scrollTo(0, 0);";

/// Scan the first three articles for an author-looking link.
const PROFILE_LINK_SCRIPT: &str = r#"
var skip = ['/photo', '/video', '/posts', '/watch', '/reel', '/groups/', '/events/',
            '/hashtag/', 'story_fbid', '/shares', '/comments', '?comment_id'];
var posts = Array.prototype.slice.call(document.querySelectorAll("[role='article']"), 0, 3);
for (var i = 0; i < posts.length; i++) {
    var links = posts[i].querySelectorAll('a[href]');
    for (var j = 0; j < links.length; j++) {
        var href = links[j].href;
        if (skip.some(function (s) { return href.indexOf(s) !== -1; })) { continue; }
        var path = href.split('?')[0].split('/').length;
        if ((href.indexOf('/profile.php') !== -1 || (path <= 5 && href.indexOf('?') === -1))
                && links[j].offsetParent !== null) {
            return links[j];
        }
    }
}
return null;
"#;

pub(super) const PROFILE_LINK: Goal = Goal {
    name: "profile link",
    locators: &[
        Locator::ByXPath("//div[@role='article']//h4//a[.//span]"),
        Locator::ByXPath("//div[@role='article']//h4//a"),
        Locator::ByXPath("//div[@role='article']//strong//a[contains(@href, 'facebook.com')]"),
        Locator::ByXPath("//div[@role='article']//a[contains(@href, 'profile.php')]"),
        Locator::ByScript(PROFILE_LINK_SCRIPT),
    ],
    reject: &["/photo", "/video"],
};

/// Path fragments that mean a click landed on content, not a profile.
pub(super) const NON_PROFILE_PATHS: [&str; 5] = ["/photo", "/video", "/posts/", "/watch", "/stories"];

const STORY_SCRIPT: &str = r#"
var section = document.querySelector('[aria-label="Stories"]') ||
              document.querySelector('[aria-label*="Stories"]');
if (section) {
    var items = section.querySelectorAll('div[role="button"], a');
    for (var i = 1; i < Math.min(items.length, 5); i++) {
        var text = (items[i].innerText || '').toLowerCase();
        if (items[i].offsetParent !== null && text.indexOf('create') === -1 && text.indexOf('add') === -1) {
            return items[i];
        }
    }
}
var links = document.querySelectorAll('a[href*="/stories/"]');
return links.length > 0 ? links[0] : null;
"#;

pub(super) const STORY: Goal = Goal {
    name: "story",
    locators: &[
        Locator::ByXPath("//div[@aria-label='Stories']//div[@role='button']"),
        Locator::ByXPath("//div[@aria-label='Stories']//a"),
        Locator::ByXPath("//a[contains(@href, '/stories/')][.//img]"),
        Locator::ByXPath("//a[contains(@href, '/stories/')]"),
        Locator::ByScript(STORY_SCRIPT),
    ],
    reject: &["create", "add to story"],
};

pub(super) const STORY_VIEWER_SCRIPT: &str = r#"
if (location.href.indexOf('/stories/') !== -1) { return true; }
var dialog = document.querySelector("[role='dialog']");
if (dialog && dialog.offsetParent !== null && dialog.querySelector('video, img')) { return true; }
return !!document.querySelector("[aria-label='Story viewer']");
"#;

pub(super) const STORY_CLOSE: Goal = Goal {
    name: "story close",
    locators: &[
        Locator::ByXPath("//div[@role='button'][@aria-label='Close']"),
        Locator::ByXPath("//*[@aria-label='Close']"),
    ],
    reject: &[],
};

pub(super) const LIKE: Goal = Goal {
    name: "like button",
    locators: &[
        Locator::ByXPath("//div[@aria-label='Like'][@role='button']"),
        Locator::ByXPath("//span[text()='Like']/ancestor::div[@role='button']"),
        Locator::ByCss("[aria-label='Like'][role='button']"),
    ],
    reject: &["unlike", "remove like"],
};

pub(super) const ALREADY_LIKED: Goal = Goal {
    name: "remove like button",
    locators: &[
        Locator::ByCss("[aria-label='Remove Like'][role='button']"),
        Locator::ByCss("[aria-label='Unlike'][role='button']"),
    ],
    reject: &[],
};

pub(super) const COMMENT_BUTTON: Goal = Goal {
    name: "comment button",
    locators: &[
        Locator::ByXPath("//div[@role='button' and contains(., 'Comment')]"),
        Locator::ByXPath("//span[contains(text(), 'Comment')]"),
        Locator::ByCss("[aria-label*='Comment']"),
    ],
    reject: &[],
};

pub(super) const TEXTBOX: [Locator; 1] =
    [Locator::ByCss("div[role='textbox'][contenteditable='true']")];

pub(super) const COMPOSER: Goal = Goal {
    name: "post composer",
    locators: &[
        Locator::ByXPath("//span[contains(text(), \"What's on your mind\")]"),
        Locator::ByCss("[aria-label*='Create a post']"),
        Locator::ByXPath("//span[contains(text(), 'What')]"),
    ],
    reject: &[],
};

pub(super) const PHOTO_BUTTON: Goal = Goal {
    name: "photo/video button",
    locators: &[
        Locator::ByXPath("//div[@aria-label='Photo/video']"),
        Locator::ByXPath("//span[contains(text(), 'Photo/video')]"),
        Locator::ByXPath("//span[contains(text(), 'Photo')]"),
    ],
    reject: &[],
};

pub(super) const FILE_INPUT: [Locator; 1] = [Locator::ByCss("input[type='file']")];

pub(super) const SET_TEXT_SCRIPT: &str = r#"
var el = arguments[0];
var text = arguments[1];
el.focus();
el.textContent = '';
el.appendChild(document.createTextNode(text));
el.dispatchEvent(new InputEvent('input', {bubbles: true, cancelable: true, inputType: 'insertText', data: text}));
el.dispatchEvent(new Event('change', {bubbles: true}));
"#;

/// Enabled Post button in the composer, or null.
pub(super) const ENABLED_POST_BUTTON_SCRIPT: &str = r#"
var paths = [
    "//div[@aria-label='Post'][@role='button']",
    "//div[@role='button'][.//span[text()='Post']]",
    "//span[text()='Post']/ancestor::div[@role='button']"
];
for (var i = 0; i < paths.length; i++) {
    var btn = document.evaluate(paths[i], document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
    if (btn && btn.offsetParent !== null && btn.getAttribute('aria-disabled') !== 'true') { return btn; }
}
return null;
"#;

pub(super) const POST_SUBMITTED_SCRIPT: &str = r#"
var dialog = document.querySelector("[role='dialog']");
if (!dialog || dialog.offsetParent === null) { return true; }
var btn = document.querySelector("div[aria-label='Post'][role='button']");
return !btn || btn.offsetParent === null;
"#;
