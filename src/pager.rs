use crate::listview::total_pages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerEntry {
    Prev { target: usize, enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { target: usize, enabled: bool },
}

/// Pagination controls for one list. Empty when everything fits on a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pager {
    pub current: usize,
    pub total_pages: usize,
    pub entries: Vec<PagerEntry>,
}

impl Pager {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn build_pager(total_items: usize, current_page: usize, page_size: usize) -> Pager {
    let total = total_pages(total_items, page_size);
    if total <= 1 {
        return Pager {
            current: 1,
            total_pages: total,
            entries: Vec::new(),
        };
    }
    let current = current_page.clamp(1, total);

    // First, last and the window around the current page.
    let mut numbers = vec![1, current.saturating_sub(1), current, current + 1, total];
    numbers.retain(|&n| n >= 1 && n <= total);
    numbers.sort_unstable();
    numbers.dedup();

    let mut entries = Vec::with_capacity(numbers.len() + 4);
    entries.push(PagerEntry::Prev {
        target: current.saturating_sub(1).max(1),
        enabled: current > 1,
    });
    let mut previous: Option<usize> = None;
    for number in numbers {
        if let Some(p) = previous
            && number > p + 1
        {
            entries.push(PagerEntry::Ellipsis);
        }
        entries.push(PagerEntry::Page {
            number,
            active: number == current,
        });
        previous = Some(number);
    }
    entries.push(PagerEntry::Next {
        target: (current + 1).min(total),
        enabled: current < total,
    });

    Pager {
        current,
        total_pages: total,
        entries,
    }
}
