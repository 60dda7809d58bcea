// Evaluation prompt template.

pub const EVALUATION_PROMPT: &str = r#"You are an AI resume evaluator. Compare the following resume to the job description and provide a concise evaluation.

Resume:
{resume_text}

Job Description:
{job_description}

Analyze the resume against the job description and provide a brief, focused evaluation.

IMPORTANT: Keep responses SHORT and CONCISE. Limit to maximum 3-4 items per category.

Respond ONLY with valid JSON in the following format (no markdown, no code blocks, just pure JSON):
{
    "score": <number between 0-100>,
    "feedback": "<brief 2-3 sentence feedback explaining the score>",
    "improvements": ["<improvement 1>", "<improvement 2>", "<improvement 3>"],
    "missingKeywords": ["<keyword 1>", "<keyword 2>", "<keyword 3>"],
    "matchingSkills": ["<skill 1>", "<skill 2>", "<skill 3>"]
}

Keep all strings brief - one short sentence or phrase per item. Maximum 3-4 items per array."#;

/// Fills the template. The job description is substituted last so that a
/// resume containing the literal `{job_description}` cannot pull it in twice.
pub fn build_evaluation_prompt(resume_text: &str, job_description: &str) -> String {
    let (head, tail) = EVALUATION_PROMPT
        .split_once("{job_description}")
        .unwrap_or((EVALUATION_PROMPT, ""));
    let mut prompt = head.replace("{resume_text}", resume_text);
    prompt.push_str(job_description);
    prompt.push_str(tail);
    prompt
}
