//! Prompt templates for the generation service.
//!
//! All templates live in one `PromptConfig` handed to the engine at
//! construction time, so no handler reaches for ambient globals.

/// The fixed prompt templates and system instruction used for every
/// generation call.
#[derive(Clone, Debug)]
pub struct PromptConfig {
    pub system_instruction: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: concat!(
                "You are a civil society activist in Sudan specializing in writing ",
                "concept notes and proposals for fundraising. Answer in the language ",
                "the user writes in.",
            )
            .to_string(),
        }
    }
}

impl PromptConfig {
    /// Problem Tree analysis of a described social problem.
    pub fn problem_tree(&self, input: &str) -> String {
        format!(
            concat!(
                "Analyze the user's described issue: ``{input}`` using the Problem Tree method. ",
                "First, identify the core problem. Then, map its root causes (e.g., political ",
                "exclusion, resource inequity) and consequences (e.g., displacement, loss of ",
                "trust in institutions). Structure your answer as:\n",
                "Trunk (Core Problem): a concise statement.\n",
                "Roots (Causes): categorized into governance, socioeconomic, or conflict-related factors.\n",
                "Branches (Effects): local, regional, and institutional impacts.\n",
                "Recommendations: actionable steps tailored to Sudanese civil society's capacity.",
            ),
            input = input
        )
    }

    /// SWOT analysis of the user's organization, campaign, or project.
    pub fn swot(&self, input: &str) -> String {
        format!(
            concat!(
                "Conduct a SWOT analysis of the user's input: ``{input}``. Structure your response as:\n",
                "Strengths: local networks, cultural expertise, donor partnerships.\n",
                "Weaknesses: funding gaps, digital security risks, capacity limitations.\n",
                "Opportunities: regional solidarity movements, UN mechanisms, grassroots mobilization tools.\n",
                "Threats: government crackdowns, misinformation, shrinking civic space.\n",
                "Highlight Sudan-specific factors and propose ways to leverage strengths against ",
                "threats. Ask for details if the input lacks focus.",
            ),
            input = input
        )
    }

    /// PESTEL analysis focused on Sudan's context.
    pub fn pestel(&self, input: &str) -> String {
        format!(
            concat!(
                "Analyze the user's challenge through a PESTEL lens, focusing on Sudan's context. ",
                "Structure the output as:\n",
                "Political: regime instability, militarization, or peace agreement impacts.\n",
                "Economic: sanctions, inflation, or reliance on informal economies.\n",
                "Social: ethnic tensions, displacement trends, or gender norms.\n",
                "Technological: internet restrictions, digital activism tools, or surveillance risks.\n",
                "Environmental: climate-driven droughts, land disputes, or water scarcity.\n",
                "Legal: NGO registration laws, anti-protest decrees, or transitional justice mechanisms.\n",
                "Here is the user's input: ``{input}``",
            ),
            input = input
        )
    }

    /// Professional concept note from the user's project description, aligned
    /// with an organization profile when one was uploaded.
    pub fn concept_note(&self, input: &str, profile: Option<&str>) -> String {
        format!(
            concat!(
                "You are an expert in development and project proposal writing. Your task is to ",
                "generate a professional concept note based on this user-provided information: ",
                "``{input}``. If the user has provided an organization profile ({profile}), you ",
                "must align the concept note with this profile and tailor the response to the ",
                "organization's priorities and values.\n",
                "The concept note should include the following sections:\n",
                "<b>Introduction (Context):</b> the background that makes the project relevant.\n",
                "<b>The Problem:</b> the main social problem the project addresses.\n",
                "<b>Theory of Change:</b> how specific actions lead to the desired outcomes.\n",
                "<b>General Goal:</b> the broad long-term impact the project aims to achieve.\n",
                "<b>Objective Goals:</b> smaller, measurable, time-bound objectives.\n",
                "<b>Target Audience:</b> the primary beneficiaries and why they are the focus.\n",
                "<b>Expected Outcomes:</b> clear, tangible results aligned with the objectives.\n",
                "Make sure your response is concise, logical, and easy to understand.",
            ),
            input = input,
            profile = profile.unwrap_or("not provided")
        )
    }

    /// Full project proposal, aligned with an organization profile when one
    /// was uploaded.
    pub fn full_proposal(&self, input: &str, profile: Option<&str>) -> String {
        format!(
            concat!(
                "You are an expert in development and project proposal writing. Your task is to ",
                "generate a professional full proposal based on this user-provided information: ",
                "``{input}``. If the user has provided an organization profile ({profile}), you ",
                "must align the proposal with this profile and tailor the response to the ",
                "organization's priorities, values, and sector of focus.\n",
                "The full proposal should include the following sections:\n",
                "<b>Introduction (Context):</b> a detailed overview of the project's background.\n",
                "<b>The Problem:</b> the main social problem, with evidence of its significance.\n",
                "<b>Theory of Change:</b> how the proposed actions lead to the desired changes.\n",
                "<b>General Goal:</b> the visionary long-term impact of the project.\n",
                "<b>Objective Goals:</b> specific, measurable, time-bound objectives.\n",
                "<b>Target Audience:</b> the primary beneficiaries with key demographic details.\n",
                "<b>Activities:</b> the key implementation steps.\n",
                "<b>Risk Assessment:</b> potential risks and mitigation strategies.\n",
                "<b>Assumptions:</b> realistic assumptions about resources, stakeholders, and context.\n",
                "<b>Challenges:</b> anticipated challenges and how to address them.\n",
                "<b>Expected Outcomes:</b> specific, measurable results aligned with the objectives.\n",
                "Make sure your response is comprehensive, concise, logical, and easy to understand. ",
                "If additional clarification is needed, request more information from the user ",
                "before completing the proposal.",
            ),
            input = input,
            profile = profile.unwrap_or("not provided")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_interpolate_input() {
        let prompts = PromptConfig::default();

        assert!(prompts.problem_tree("water scarcity").contains("water scarcity"));
        assert!(prompts.swot("youth campaign").contains("youth campaign"));
        assert!(prompts.pestel("internet shutdowns").contains("internet shutdowns"));
    }

    #[test]
    fn test_document_templates_interpolate_profile() {
        let prompts = PromptConfig::default();

        let with_profile = prompts.concept_note("flood relief", Some("Nile Relief Org"));
        assert!(with_profile.contains("flood relief"));
        assert!(with_profile.contains("Nile Relief Org"));

        let without_profile = prompts.full_proposal("flood relief", None);
        assert!(without_profile.contains("not provided"));
    }
}
