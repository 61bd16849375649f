/// CSS selectors of the quiz UI.
pub mod selectors {
    pub const COOKIES_MODAL: &str = ".fc-consent-root";
    pub const LOGIN_INPUT: &str = "[name=log_email]";
    pub const PASSWORD_INPUT: &str = "[name=log_password]";
    pub const LOGIN_BUTTON: &str = "form button[type=submit]";
    pub const LOADING: &str = "#loading";
    pub const NEW_WORD_MODAL_CLOSE: &str = "#know_new";
    pub const POSSIBLE_WORD_MODAL_CLOSE: &str = "#skip";
    pub const START_SESSION: &str = "#start_session_button";
    pub const CONTINUE_SESSION: &str = "#continue_session_button";
    pub const FINISH_PAGE: &str = "#finish_page";
    pub const QUESTION: &str = ".usage_example";
    pub const TRANSLATION: &str = ".translation";
    pub const ANSWER_INPUT: &str = "#answer";
    pub const SUBMIT_ANSWER: &str = "#check";
    pub const CORRECT_ANSWER: &str = "#word";
    pub const NEXT_QUESTION: &str = "#nextword";
}

/// Query parameter carrying the student id after a successful login.
pub const STUDENT_ID_PARAM: &str = "student_id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    base_url: String,
}

impl Default for Site {
    fn default() -> Self {
        Self::new("https://instaling.pl")
    }
}

impl Site {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}/teacher.php?page=login", self.base_url)
    }

    pub fn session_url(&self, student_id: &str) -> String {
        format!("{}/ling2/html_app/app.php?child_id={student_id}", self.base_url)
    }
}

/// Value of query parameter `name` in `url`, if present and non-empty.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn student_id_from_url(url: &str) -> Option<String> {
    query_param(url, STUDENT_ID_PARAM)
}
