//! Generation prompts for new bank entries.

use pagesmith_shared::Category;

const BASE_RULES: &str = "\
Write a complete, self-contained HTML page (no external CSS or JS). \
Return only the final HTML document.

Requirements:
- Include <meta charset>, a viewport meta tag, <title>, a meta description and meta keywords.
- Solve the problem the way an exam answer would, step by step, with real numbers.
- Use plain tags only: <h1>, <h2>, <h3>, <p>, <pre>, <table border=\"1\">, <ul>, <li>.
- Show several worked tables or calculations and state the final numeric answers.
- Aim for 1500 to 2500 words of substantive explanation.
- Sections: Problem Setup, Step-by-step Solution, Final Answers, Common Mistakes, \
FAQ (3 to 5 questions), Conclusion.
- Vary the wording; avoid boilerplate phrasing.
- No external links. Do not mention AI or these instructions.
";

const PRACTICE_RULE: &str =
    "- End with at least one short extra practice question, with its final answer.\n";

fn category_rules(category: Category) -> &'static str {
    match category {
        Category::Scheduling => {
            "Topic: CPU scheduling worked example.
- Give a process table (process, arrival time, burst time; priority only when the algorithm uses it).
- Pick a realistic time quantum when round robin is involved.
- Draw the Gantt chart (text is fine).
- Compute completion, turnaround and waiting time per process, plus the averages.
"
        }
        Category::PageReplacement => {
            "Topic: page replacement worked example.
- State the reference string and the number of frames.
- Show the frame contents after every reference and mark each page fault.
- When several algorithms are compared, count faults for each one and summarize them in a table.
- Finish with the total page faults (the fault rate is optional).
"
        }
        Category::Deadlock => {
            "Topic: deadlock avoidance or detection worked example.
- Give Allocation, Max and Available (or a resource allocation graph) with concrete numbers.
- Derive the Need matrix, walk through every safety-check iteration, and give the safe sequence or show the deadlock.
- Close with a Work/Finish summary table.
"
        }
        Category::Parsing => {
            "Topic: compiler parsing worked example.
- State the grammar.
- Build the sets and tables the technique needs (FIRST/FOLLOW and a parsing table, or LR items with ACTION/GOTO).
- Trace the parse of an input string as stack / input / action rows.
- Say whether the input is accepted and give the parse tree or derivation in text form.
"
        }
        Category::Other => {
            "Topic: worked example.
- Give a full step-by-step solution with tables and final answers.
"
        }
    }
}

/// Build the generation prompt stored on a new bank entry.
pub fn build_prompt(category: Category, title: &str) -> String {
    let title = title.trim();
    let mut prompt = String::with_capacity(BASE_RULES.len() + 1024);

    prompt.push_str(BASE_RULES);
    prompt.push_str("\nTitle: ");
    prompt.push_str(title);
    prompt.push_str("\nUse the title as the <h1>.\n\n");
    prompt.push_str(category_rules(category));
    if category != Category::Other {
        prompt.push_str(PRACTICE_RULE);
    }

    prompt
}
