use crate::config::Config;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use std::rc::Rc;
use tfviz_core::detail::ResourceDetail;
use tfviz_core::{DependencyIndex, Graph, Group, Groups, NodeId, Resource, RuleSet, State, Tree};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Groups,
    Resources,
}

impl Pane {
    pub fn toggled(self) -> Self {
        match self {
            Pane::Groups => Pane::Resources,
            Pane::Resources => Pane::Groups,
        }
    }
}

/// One event-loop input after key decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Quit,
    Up,
    Down,
    ToggleFocus,
    Focus(Pane),
    Select,
    ScrollDetail(i32),
    Resize { width: u16, height: u16 },
}

impl Input {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Input::Quit),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Char('q') => Some(Input::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Input::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Input::Down),
            KeyCode::Tab | KeyCode::BackTab => Some(Input::ToggleFocus),
            KeyCode::Right | KeyCode::Char('l') => Some(Input::Focus(Pane::Resources)),
            KeyCode::Left | KeyCode::Char('h') => Some(Input::Focus(Pane::Groups)),
            KeyCode::Enter => Some(Input::Select),
            KeyCode::PageDown => Some(Input::ScrollDetail(1)),
            KeyCode::PageUp => Some(Input::ScrollDetail(-1)),
            _ => None,
        }
    }
}

pub struct App {
    pub config: Config,
    pub state: State,
    pub index: Rc<DependencyIndex>,
    pub graph: Graph,
    pub groups: Groups,
    pub group_keys: Vec<String>,
    pub tree: Tree,
    pub focus: Pane,
    pub group_cursor: usize,
    pub resource_cursor: usize,
    pub width: u16,
    pub height: u16,
    pub detail_scroll: u16,
    pub detail_max_scroll: u16,
    pub group_list: ListState,
    pub resource_list: ListState,
    should_quit: bool,
}

impl App {
    pub fn new(state: State, config: Config) -> Self {
        let index = Rc::new(DependencyIndex::build(&state));
        let graph = Graph::build(&state);
        let groups = RuleSet::aws(Rc::clone(&index)).apply(&state);
        let mut group_keys: Vec<String> = groups.keys().cloned().collect();
        group_keys.sort();
        let tree = Tree::project(&groups);

        info!(
            resources = state.resources.len(),
            instances = graph.len(),
            groups = group_keys.len(),
            "snapshot ready"
        );

        Self {
            config,
            state,
            index,
            graph,
            groups,
            group_keys,
            tree,
            focus: Pane::Groups,
            group_cursor: 0,
            resource_cursor: 0,
            width: 0,
            height: 0,
            detail_scroll: 0,
            detail_max_scroll: 0,
            group_list: ListState::default(),
            resource_list: ListState::default(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(input) = Input::from_key(key) {
            self.handle(input);
        }
    }

    pub fn handle(&mut self, input: Input) {
        if self.should_quit {
            return;
        }
        match input {
            Input::Quit => {
                debug!("quit requested");
                self.should_quit = true;
            }
            Input::Up => self.move_cursor(-1),
            Input::Down => self.move_cursor(1),
            Input::ToggleFocus => self.focus = self.focus.toggled(),
            Input::Focus(pane) => self.focus = pane,
            // Reserved for expanding a resource into its instances.
            Input::Select => {}
            Input::ScrollDetail(pages) => self.scroll_detail(pages),
            Input::Resize { width, height } => {
                self.width = width;
                self.height = height;
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Pane::Groups => {
                let next = step(self.group_cursor, delta, self.group_keys.len());
                if next != self.group_cursor {
                    self.group_cursor = next;
                    self.resource_cursor = 0;
                    self.detail_scroll = 0;
                }
            }
            Pane::Resources => {
                let len = self.selected_group().map_or(0, |g| g.resources.len());
                let next = step(self.resource_cursor, delta, len);
                if next != self.resource_cursor {
                    self.resource_cursor = next;
                    self.detail_scroll = 0;
                }
            }
        }
    }

    fn scroll_detail(&mut self, pages: i32) {
        let page = i32::from((self.height / 2).max(1));
        let next = i32::from(self.detail_scroll) + pages * page;
        self.detail_scroll = next.clamp(0, i32::from(self.detail_max_scroll)) as u16;
    }

    /// Records how far the detail pane can scroll for the content just laid
    /// out, pulling the offset back if the content shrank.
    pub fn set_detail_max_scroll(&mut self, max_scroll: u16) {
        self.detail_max_scroll = max_scroll;
        if self.detail_scroll > max_scroll {
            self.detail_scroll = max_scroll;
        }
    }

    pub fn selected_group(&self) -> Option<&Group> {
        self.group_keys
            .get(self.group_cursor)
            .and_then(|key| self.groups.get(key))
    }

    pub fn selected_resource(&self) -> Option<&Rc<Resource>> {
        self.selected_group()
            .and_then(|group| group.resources.get(self.resource_cursor))
    }

    pub fn selected_group_node(&self) -> Option<NodeId> {
        self.tree.groups().get(self.group_cursor).copied()
    }

    pub fn selected_resource_node(&self) -> Option<NodeId> {
        let group = self.selected_group_node()?;
        self.tree.children(group).get(self.resource_cursor).copied()
    }

    /// Tree leaves for the selected group, in the same order as its resources.
    pub fn resource_nodes(&self) -> &[NodeId] {
        self.selected_group_node()
            .map(|group| self.tree.children(group))
            .unwrap_or_default()
    }

    /// Full text outline of the tree, with multi-instance resources expanded
    /// into their instances.
    pub fn outline(&self, width: usize) -> Vec<String> {
        let mut tree = self.tree.clone();
        let leaves: Vec<NodeId> = tree
            .groups()
            .iter()
            .flat_map(|group| tree.children(*group).to_vec())
            .collect();
        for leaf in leaves {
            if tree.attach_instances(leaf) > 1 {
                tree.set_expanded(leaf, true);
            }
        }
        tree.render_lines(None, width)
    }

    pub fn detail(&self) -> Option<ResourceDetail> {
        let res = self.selected_resource()?;
        let label = self
            .selected_resource_node()
            .and_then(|id| self.tree.node(id))
            .map(|node| node.label.as_str())
            .unwrap_or(res.address.as_str());
        Some(ResourceDetail::build(label, res, &self.graph, &self.index))
    }
}

fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}
