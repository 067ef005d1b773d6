//! Picks the upstream model for a message.
//!
//! A message that mentions any programming term goes to the coding model,
//! everything else to the general model. Misclassification only costs
//! answer quality, never a failed send.

use std::sync::LazyLock;

use regex::Regex;

const CODING_TERMS: &[&str] = &[
    "code", "script", "program", "function", "class", "variable", "algorithm", "debug",
    "method", "loop", "array", "object", "html", "css", "javascript", "python", "java", "cpp",
    "sql", "database", "api", "library", "package", "npm", "pip", "git", "docker", "framework",
    "react", "vue", "angular", "nodejs", "express", "django", "flask", "fastapi", "mongodb",
    "postgres", "mysql", "firebase", "auth", "middleware", "router", "component", "state",
    "props", "event", "hook", "lifecycle", "render", "virtual dom", "jsx", "typescript", "rust",
    "golang", "ruby", "php", "swift", "kotlin", "webgl", "canvas", "svg", "json", "xml", "regex",
    "terminal", "bash", "shell", "github", "gitlab", "bitbucket", "devops", "ci", "cd",
    "kubernetes", "terraform", "ansible", "jenkins", "github actions", "build", "deploy",
    "release", "version", "semantic versioning", "yarn", "webpack", "babel", "eslint",
    "prettier", "jest", "unittest", "pytest", "mocha", "chai", "type safety", "generics",
    "interfaces", "abstract", "inheritance", "polymorphism", "design patterns",
    "solid principles", "clean code", "refactor", "optimization", "performance", "security",
    "encryption", "hashing", "jwt", "oauth", "rest", "graphql", "websocket", "socket.io",
    "real-time", "streaming", "async", "await", "promises", "callbacks", "error handling",
    "try catch", "logging", "debugging", "testing", "mocking", "fixture", "stub",
    "integration test", "unit test", "end to end test",
];

static CODING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = CODING_TERMS
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("coding vocabulary compiles")
});

#[derive(Debug, Clone)]
pub struct ModelRouter {
    coding_model: String,
    general_model: String,
}

impl ModelRouter {
    pub fn new(coding_model: impl Into<String>, general_model: impl Into<String>) -> Self {
        Self {
            coding_model: coding_model.into(),
            general_model: general_model.into(),
        }
    }

    pub fn is_coding(message: &str) -> bool {
        CODING_PATTERN.is_match(message)
    }

    pub fn select(&self, message: &str) -> &str {
        if Self::is_coding(message) {
            &self.coding_model
        } else {
            &self.general_model
        }
    }
}
