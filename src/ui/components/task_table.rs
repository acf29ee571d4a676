//! Task list of a single service, shown after pressing Enter on the service list.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::backend::ServiceTask;

pub struct TaskTable {
    pub service_id: String,
    pub tasks: Vec<ServiceTask>,
}

impl TaskTable {
    pub fn new(service_id: String, tasks: Vec<ServiceTask>) -> Self {
        Self { service_id, tasks }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["ID", "NODE", "STATE", "DESIRED"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows = self.tasks.iter().map(|task| {
            let style = if task.state == task.desired_state {
                Style::default()
            } else {
                Style::default().fg(Color::Red)
            };
            Row::new(vec![
                task.id.clone(),
                task.node.clone(),
                task.state.clone(),
                task.desired_state.clone(),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Tasks of service {} ({}) • Esc: back ", self.service_id, self.tasks.len())),
        );
        f.render_widget(table, area);
    }
}
