/// Incrementally constructs C# source text with indentation handling.
#[derive(Debug, Default, Clone)]
pub struct CSharpSourceBuilder {
    content: String,
    indent_level: usize,
    indent: String,
}

impl CSharpSourceBuilder {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            indent_level: 0,
            indent: indent.into(),
        }
    }

    /// Append one line at the current indentation. Empty lines carry no
    /// trailing whitespace.
    pub fn push_line(&mut self, line: &str) {
        if !line.is_empty() {
            self.push_indent();
            self.content.push_str(line);
        }
        self.content.push('\n');
    }

    /// Append pre-rendered text line by line, re-indented to the current level.
    pub fn push_block(&mut self, text: &str) {
        for line in text.lines() {
            self.push_line(line);
        }
    }

    pub fn push_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.content.push_str(&self.indent);
        }
    }

    /// Open a `{` block and indent.
    pub fn open_brace(&mut self) {
        self.push_line("{");
        self.indent();
    }

    /// Dedent and close a block.
    pub fn close_brace(&mut self) {
        self.dedent();
        self.push_line("}");
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn build(self) -> String {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
