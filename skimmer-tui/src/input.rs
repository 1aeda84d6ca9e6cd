/// Single-line editor; `cursor` is a byte offset kept on a char boundary.
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the current text, leaving the line empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.drain(self.cursor..next);
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputLine {
        let mut line = InputLine::default();
        s.chars().for_each(|c| line.insert(c));
        line
    }

    #[test]
    fn editing_respects_multibyte_chars() {
        let mut line = typed("héllo");
        line.left();
        line.left();
        line.left();
        line.backspace();
        assert_eq!(line.text(), "hllo");
        assert_eq!(line.cursor(), 1);

        line.insert('é');
        line.home();
        line.delete();
        assert_eq!(line.text(), "éllo");
        line.right();
        assert_eq!(line.cursor(), 'é'.len_utf8());
    }

    #[test]
    fn edges_are_no_ops() {
        let mut line = typed("ab");
        line.right();
        line.delete();
        assert_eq!(line.text(), "ab");
        line.home();
        line.left();
        line.backspace();
        assert_eq!(line.text(), "ab");
        line.end();
        assert_eq!(line.take(), "ab");
        assert_eq!(line.text(), "");
        assert_eq!(line.cursor(), 0);
    }
}
