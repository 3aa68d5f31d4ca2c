//! Navigation entry points.
//!
//! Dashboard, analysis and report views are not implemented yet; these
//! entry points only acknowledge the request, either from `--navigate` or
//! from the buttons on the HTML dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A view the user asked to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationTarget {
    Dashboard,
    Analysis,
    Report,
}

impl NavigationTarget {
    /// Acknowledgement prefix shown to the user.
    fn prefix(&self) -> &'static str {
        match self {
            NavigationTarget::Dashboard => "Navegar para o dashboard",
            NavigationTarget::Analysis => "Ir para análise",
            NavigationTarget::Report => "Abrir relatório",
        }
    }

    /// Button caption on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            NavigationTarget::Dashboard => "Dashboard",
            NavigationTarget::Analysis => "Análise",
            NavigationTarget::Report => "Relatório",
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationTarget::Dashboard => write!(f, "dashboard"),
            NavigationTarget::Analysis => write!(f, "analysis"),
            NavigationTarget::Report => write!(f, "report"),
        }
    }
}

impl FromStr for NavigationTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(NavigationTarget::Dashboard),
            "analysis" | "analise" | "análise" => Ok(NavigationTarget::Analysis),
            "report" | "relatorio" | "relatório" => Ok(NavigationTarget::Report),
            other => Err(format!(
                "unknown navigation target '{}' (expected dashboard, analysis or report)",
                other
            )),
        }
    }
}

/// A parsed `target:category` request, from `--navigate` or `report.navigation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NavigationRequest {
    pub target: NavigationTarget,
    pub category: String,
}

impl FromStr for NavigationRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, category) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TARGET:CATEGORY, got '{}'", s))?;

        let category = category.trim();
        if category.is_empty() {
            return Err("navigation category must not be empty".to_string());
        }

        Ok(Self {
            target: target.parse()?,
            category: category.to_string(),
        })
    }
}

impl NavigationRequest {
    pub fn new(target: NavigationTarget, category: impl Into<String>) -> Self {
        Self {
            target,
            category: category.into(),
        }
    }
}

impl TryFrom<String> for NavigationRequest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NavigationRequest> for String {
    fn from(request: NavigationRequest) -> Self {
        request.to_string()
    }
}

impl fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.category)
    }
}

/// Buttons shown on the dashboard when the config does not list any.
pub fn default_requests() -> Vec<NavigationRequest> {
    vec![
        NavigationRequest::new(NavigationTarget::Dashboard, "geral"),
        NavigationRequest::new(NavigationTarget::Analysis, "antecedencia"),
        NavigationRequest::new(NavigationTarget::Report, "mensal"),
    ]
}

/// The response to a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub target: NavigationTarget,
    pub category: String,
    pub message: String,
}

/// Acknowledge a navigation request. No routing happens.
pub fn navigate(target: NavigationTarget, category: &str) -> Acknowledgement {
    Acknowledgement {
        target,
        category: category.to_string(),
        message: format!("{}: {}", target.prefix(), category),
    }
}
