use crate::blocks::Block;
use crate::debug_if_enabled;

/// Сборщик строки статуса.
///
/// Keeps the composed status line and a copy of what was last handed to the
/// publisher. Each block contributes `text [marker] delimiter '\n'`; the last
/// delimiter and its newline are stripped.
pub struct StatusComposer {
    delimiter: Vec<u8>,
    status: Vec<u8>,
    published: Option<Vec<u8>>,
}

impl StatusComposer {
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Self {
        Self {
            delimiter: delimiter.into(),
            status: Vec::new(),
            published: None,
        }
    }

    /// Текущая собранная строка статуса
    #[cfg(test)]
    pub fn status(&self) -> &[u8] {
        &self.status
    }

    /// Пересобрать строку, если вывод хотя бы одного блока изменился.
    ///
    /// Returns `true` when the string was rebuilt. Every block's previous
    /// output is brought up to date during the rebuild.
    pub fn compose(&mut self, blocks: &mut [Block]) -> bool {
        // Проход 1: есть ли вообще изменения
        if !blocks.iter().any(Block::is_dirty) {
            return false;
        }

        // Проход 2: полная пересборка в порядке реестра
        self.status.clear();
        let mut has_text = false;

        for block in blocks.iter_mut() {
            let text = block.current().as_bytes();
            if !text.is_empty() {
                has_text = true;
                self.status.extend_from_slice(text);
                if let Some(marker) = block.click_marker() {
                    self.status.push(marker);
                }
            }
            block.commit();

            // Пустой блок всё равно получает разделитель - позиции блоков не сдвигаются
            self.status.extend_from_slice(&self.delimiter);
            self.status.push(b'\n');
        }

        if has_text {
            let tail = self.delimiter.len() + 1;
            self.status.truncate(self.status.len() - tail);
        } else {
            self.status.clear();
        }

        debug_if_enabled!("Новая строка статуса: {:?}", String::from_utf8_lossy(&self.status));
        true
    }

    /// Строка для публикации, если она отличается от последней опубликованной
    pub fn pending(&self) -> Option<&[u8]> {
        match &self.published {
            Some(published) if published == &self.status => None,
            _ => Some(&self.status),
        }
    }

    pub fn mark_published(&mut self) {
        self.published = Some(self.status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockOutput, BlockSpec};

    fn block(signal: u8, click: Option<&'static str>) -> Block {
        Block::new(BlockSpec::new("/bin/true", click, 1, signal))
    }

    fn set(block: &mut Block, text: &[u8]) {
        block.set_output(BlockOutput::from_captured(text, 25));
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_unchanged_outputs_are_not_rebuilt() {
        let mut composer = StatusComposer::new(" | ");
        let mut blocks = vec![block(0, None), block(0, None)];

        // Всё пусто и было пусто
        assert!(!composer.compose(&mut blocks));

        set(&mut blocks[0], b"a\n");
        assert!(composer.compose(&mut blocks));

        // Тот же вывод ещё раз - изменений нет
        set(&mut blocks[0], b"a\n");
        assert!(!composer.compose(&mut blocks));
    }

    #[test]
    fn test_delimiters_between_blocks_only() {
        let mut composer = StatusComposer::new(" | ");
        let mut blocks = vec![block(0, None), block(0, None), block(0, None)];
        set(&mut blocks[0], b"cpu 3%\n");
        set(&mut blocks[1], b"mem 1G\n");
        set(&mut blocks[2], b"12:00\n");

        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"cpu 3% | \nmem 1G | \n12:00");
        assert_eq!(count(composer.status(), b" | "), blocks.len() - 1);
        assert!(!composer.status().ends_with(b" | \n"));
    }

    #[test]
    fn test_empty_block_keeps_its_delimiter() {
        let mut composer = StatusComposer::new(" | ");
        let mut blocks = vec![block(0, None), block(0, None), block(0, None)];
        set(&mut blocks[0], b"a\n");
        set(&mut blocks[2], b"c\n");

        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"a | \n | \nc");

        // Пустой последний блок: разделитель перед ним остаётся
        set(&mut blocks[2], b"\n");
        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"a | \n | \n");
        assert_eq!(count(composer.status(), b" | "), 2);
    }

    #[test]
    fn test_all_empty_gives_empty_status() {
        let mut composer = StatusComposer::new(" | ");
        let mut blocks = vec![block(0, None), block(0, None)];
        set(&mut blocks[1], b"x\n");
        assert!(composer.compose(&mut blocks));

        set(&mut blocks[1], b"");
        assert!(composer.compose(&mut blocks));
        assert!(composer.status().is_empty());
    }

    #[test]
    fn test_click_marker_byte() {
        let mut composer = StatusComposer::new("|");
        let mut blocks = vec![block(2, Some("/bin/true")), block(4, None), block(0, Some("/bin/true"))];
        set(&mut blocks[0], b"vol\n");
        set(&mut blocks[1], b"bat\n");
        set(&mut blocks[2], b"date\n");

        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"vol\x02|\nbat|\ndate");
    }

    #[test]
    fn test_prefix_changes_are_detected() {
        let mut composer = StatusComposer::new(" ");
        let mut blocks = vec![block(0, None)];

        set(&mut blocks[0], b"10\n");
        assert!(composer.compose(&mut blocks));

        // Новый вывод длиннее с тем же префиксом
        set(&mut blocks[0], b"100\n");
        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"100");

        // Новый вывод короче с тем же префиксом
        set(&mut blocks[0], b"1\n");
        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"1");

        // Одинаковая длина, другой последний байт
        set(&mut blocks[0], b"2\n");
        assert!(composer.compose(&mut blocks));
        assert_eq!(composer.status(), b"2");
    }

    #[test]
    fn test_pending_skips_already_published() {
        let mut composer = StatusComposer::new(" | ");
        let mut blocks = vec![block(0, None)];
        set(&mut blocks[0], b"a\n");
        composer.compose(&mut blocks);

        assert_eq!(composer.pending(), Some(&b"a"[..]));
        composer.mark_published();
        assert_eq!(composer.pending(), None);

        // a -> b -> a: строка пересобрана, но совпадает с опубликованной
        set(&mut blocks[0], b"b\n");
        composer.compose(&mut blocks);
        set(&mut blocks[0], b"a\n");
        composer.compose(&mut blocks);
        assert_eq!(composer.pending(), None);
    }
}
