mod test_duplicate_join_ignored;
